//! Race-control message log
//!
//! A timestamped, driver-attributed log of everything notable that happens in
//! a session: AI takeovers, damage, and every game event. Messages are kept in
//! arrival order and indexed by each involved driver.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::EventDetails;

/// What produced a race-control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    AiControl,
    CarDamage,
    Collision,
    Overtake,
    FastestLap,
    Retirement,
    Penalty,
    SpeedTrap,
    PitLane,
    Flashback,
    SessionLifecycle,
    StartProcedure,
    Drs,
    Flag,
    SafetyCar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceControlMessage {
    pub id: usize,
    /// Session time in seconds
    pub timestamp: f32,
    pub kind: MessageKind,
    pub driver_index: Option<usize>,
    pub involved_drivers: Vec<usize>,
    pub lap: Option<u8>,
    pub message: String,
}

/// Append-only message log with a per-driver index.
#[derive(Debug, Default, Clone)]
pub struct RaceControlManager {
    enabled: bool,
    messages: Vec<RaceControlMessage>,
    by_driver: HashMap<usize, Vec<usize>>,
}

impl RaceControlManager {
    /// When `enabled` is false every push is discarded.
    pub fn new(enabled: bool) -> Self {
        Self { enabled, ..Default::default() }
    }

    /// Append a message. The first involved driver is the primary one.
    /// Returns the message id, or `None` when retention is disabled.
    pub fn push(
        &mut self,
        timestamp: f32,
        kind: MessageKind,
        involved_drivers: Vec<usize>,
        lap: Option<u8>,
        message: impl Into<String>,
    ) -> Option<usize> {
        if !self.enabled {
            return None;
        }
        let id = self.messages.len();
        for driver in &involved_drivers {
            self.by_driver.entry(*driver).or_default().push(id);
        }
        self.messages.push(RaceControlMessage {
            id,
            timestamp,
            kind,
            driver_index: involved_drivers.first().copied(),
            involved_drivers,
            lap,
            message: message.into(),
        });
        Some(id)
    }

    pub fn messages(&self) -> &[RaceControlMessage] {
        &self.messages
    }

    /// Messages involving `driver`, in arrival order.
    pub fn for_driver(&self, driver: usize) -> Vec<&RaceControlMessage> {
        self.by_driver
            .get(&driver)
            .map(|ids| ids.iter().filter_map(|id| self.messages.get(*id)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.by_driver.clear();
    }
}

/// Classify a game event and render it as text. `name` resolves a car index
/// to a display name.
pub fn describe_event(
    details: &EventDetails,
    name: impl Fn(u8) -> String,
) -> (MessageKind, Vec<usize>, String) {
    use EventDetails::*;
    let idx = |v: &u8| usize::from(*v);
    match details {
        SessionStarted => (MessageKind::SessionLifecycle, vec![], "Session started".into()),
        SessionEnded => (MessageKind::SessionLifecycle, vec![], "Session ended".into()),
        FastestLap { vehicle_idx, lap_time } => (
            MessageKind::FastestLap,
            vec![idx(vehicle_idx)],
            format!(
                "Fastest lap by {}: {}",
                name(*vehicle_idx),
                crate::format::lap_time((lap_time * 1000.0).round() as u32)
            ),
        ),
        Retirement { vehicle_idx, .. } => (
            MessageKind::Retirement,
            vec![idx(vehicle_idx)],
            format!("{} retired", name(*vehicle_idx)),
        ),
        DrsEnabled => (MessageKind::Drs, vec![], "DRS enabled".into()),
        DrsDisabled => (MessageKind::Drs, vec![], "DRS disabled".into()),
        TeamMateInPits { vehicle_idx } => (
            MessageKind::PitLane,
            vec![idx(vehicle_idx)],
            format!("Team mate {} in the pits", name(*vehicle_idx)),
        ),
        ChequeredFlag => (MessageKind::Flag, vec![], "Chequered flag".into()),
        RaceWinner { vehicle_idx } => (
            MessageKind::Flag,
            vec![idx(vehicle_idx)],
            format!("{} wins the race", name(*vehicle_idx)),
        ),
        Penalty { vehicle_idx, other_vehicle_idx, penalty_type, infringement_type, time, .. } => {
            let mut involved = vec![idx(vehicle_idx)];
            if usize::from(*other_vehicle_idx) < crate::types::MAX_CARS {
                involved.push(idx(other_vehicle_idx));
            }
            (
                MessageKind::Penalty,
                involved,
                format!(
                    "Penalty for {}: type {} (infringement {}), {}s",
                    name(*vehicle_idx),
                    penalty_type,
                    infringement_type,
                    time
                ),
            )
        }
        SpeedTrap { vehicle_idx, speed, .. } => (
            MessageKind::SpeedTrap,
            vec![idx(vehicle_idx)],
            format!("Speed trap: {} at {:.1} km/h", name(*vehicle_idx), speed),
        ),
        StartLights { num_lights } => {
            (MessageKind::StartProcedure, vec![], format!("Start lights: {}", num_lights))
        }
        LightsOut => (MessageKind::StartProcedure, vec![], "Lights out".into()),
        DriveThroughServed { vehicle_idx } => (
            MessageKind::Penalty,
            vec![idx(vehicle_idx)],
            format!("{} served a drive-through penalty", name(*vehicle_idx)),
        ),
        StopGoServed { vehicle_idx, stop_time } => (
            MessageKind::Penalty,
            vec![idx(vehicle_idx)],
            format!("{} served a stop-go penalty ({:.1}s)", name(*vehicle_idx), stop_time),
        ),
        Flashback { session_time, .. } => (
            MessageKind::Flashback,
            vec![],
            format!("Flashback to session time {:.3}s", session_time),
        ),
        Buttons { .. } => (MessageKind::SessionLifecycle, vec![], "Button press".into()),
        RedFlag => (MessageKind::Flag, vec![], "Red flag".into()),
        Overtake { overtaking_vehicle_idx, being_overtaken_vehicle_idx } => (
            MessageKind::Overtake,
            vec![idx(overtaking_vehicle_idx), idx(being_overtaken_vehicle_idx)],
            format!(
                "{} overtook {}",
                name(*overtaking_vehicle_idx),
                name(*being_overtaken_vehicle_idx)
            ),
        ),
        SafetyCar { safety_car_type, event_type } => {
            let car = match safety_car_type {
                1 => "Safety car",
                2 => "Virtual safety car",
                3 => "Formation lap safety car",
                _ => "Safety car",
            };
            let action = match event_type {
                0 => "deployed",
                1 => "returning",
                2 => "returned",
                3 => "resume race",
                _ => "update",
            };
            (MessageKind::SafetyCar, vec![], format!("{} {}", car, action))
        }
        Collision { vehicle1_idx, vehicle2_idx } => (
            MessageKind::Collision,
            vec![idx(vehicle1_idx), idx(vehicle2_idx)],
            format!("Collision between {} and {}", name(*vehicle1_idx), name(*vehicle2_idx)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_manager_retains_nothing() {
        let mut manager = RaceControlManager::new(false);
        assert_eq!(manager.push(1.0, MessageKind::Flag, vec![3], None, "Red flag"), None);
        assert!(manager.is_empty());
        assert!(manager.for_driver(3).is_empty());
    }

    #[test]
    fn messages_are_indexed_by_every_involved_driver() {
        let mut manager = RaceControlManager::new(true);
        manager.push(10.0, MessageKind::Collision, vec![1, 4], Some(2), "Collision");
        manager.push(12.5, MessageKind::CarDamage, vec![4], Some(2), "Front wing damage");
        manager.push(13.0, MessageKind::Flag, vec![], None, "Red flag");

        assert_eq!(manager.len(), 3);
        assert_eq!(manager.for_driver(1).len(), 1);
        let for_four: Vec<_> = manager.for_driver(4).iter().map(|m| m.id).collect();
        assert_eq!(for_four, vec![0, 1]);
        assert_eq!(manager.messages()[0].driver_index, Some(1));
        assert_eq!(manager.messages()[2].driver_index, None);

        manager.clear();
        assert!(manager.is_empty());
        assert!(manager.for_driver(4).is_empty());
    }

    #[test]
    fn describe_names_both_collision_parties() {
        let details = EventDetails::Collision { vehicle1_idx: 0, vehicle2_idx: 5 };
        let (kind, involved, text) = describe_event(&details, |i| format!("CAR{}", i));
        assert_eq!(kind, MessageKind::Collision);
        assert_eq!(involved, vec![0, 5]);
        assert_eq!(text, "Collision between CAR0 and CAR5");
    }

    #[test]
    fn describe_formats_fastest_lap_time() {
        let details = EventDetails::FastestLap { vehicle_idx: 2, lap_time: 83.456 };
        let (_, _, text) = describe_event(&details, |_| "VERSTAPPEN".to_string());
        assert_eq!(text, "Fastest lap by VERSTAPPEN: 1:23.456");
    }
}
