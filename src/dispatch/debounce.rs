//! Per-action debouncing of UDP action buttons

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Actions that can be bound to a UDP action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    CustomMarker,
    TyreDelta,
    HudToggle,
}

impl ButtonAction {
    pub const ALL: [ButtonAction; 3] =
        [ButtonAction::CustomMarker, ButtonAction::TyreDelta, ButtonAction::HudToggle];
}

/// Suppresses re-triggers of the same action within `min_interval`.
#[derive(Debug)]
pub struct ButtonDebouncer {
    min_interval: Duration,
    last: HashMap<ButtonAction, Instant>,
}

impl ButtonDebouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last: HashMap::new() }
    }

    /// Register a press at `now`; returns whether the action should fire.
    pub fn on_press(&mut self, action: ButtonAction, now: Instant) -> bool {
        match self.last.get(&action) {
            Some(last) if now.saturating_duration_since(*last) < self.min_interval => false,
            _ => {
                self.last.insert(action, now);
                true
            }
        }
    }
}
