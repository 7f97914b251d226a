//! Button status bit flags carried by the `Buttons` event

use serde::{Deserialize, Serialize};

/// Constants for interpreting the button status mask.
pub mod flags {
    pub const CROSS_OR_A: u32 = 0x0000_0001;
    pub const TRIANGLE_OR_Y: u32 = 0x0000_0002;
    pub const CIRCLE_OR_B: u32 = 0x0000_0004;
    pub const SQUARE_OR_X: u32 = 0x0000_0008;
    pub const OPTIONS_OR_MENU: u32 = 0x0000_0800;

    /// Bit of UDP action 1; actions 2..=12 follow in consecutive bits.
    pub const UDP_ACTION_1: u32 = 0x0010_0000;

    /// Number of UDP action buttons the game exposes.
    pub const UDP_ACTION_COUNT: u8 = 12;
}

/// Button status mask from a `Buttons` event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonFlags(pub u32);

impl ButtonFlags {
    /// Create a new mask from its raw value.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Check if a specific flag is set using a bitmask.
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Check whether UDP action `code` (1-based) is pressed.
    ///
    /// Codes outside `1..=12` are never pressed.
    pub fn udp_action_pressed(&self, code: u8) -> bool {
        udp_action_mask(code).is_some_and(|mask| self.has_flag(mask))
    }

    /// Get the raw u32 value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Bitmask for UDP action `code` (1-based), if the code is in range.
pub fn udp_action_mask(code: u8) -> Option<u32> {
    (1..=flags::UDP_ACTION_COUNT).contains(&code).then(|| flags::UDP_ACTION_1 << (code - 1))
}
