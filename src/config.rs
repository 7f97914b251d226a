//! Engine settings
//!
//! Settings are owned by an external settings collaborator; this module only
//! describes their shape and loads them from YAML. Every section has defaults
//! so a partial (or empty) document is valid.
//!
//! ```yaml
//! privacy:
//!   process_car_setups: false
//! udp_action_codes:
//!   custom_marker: 11
//!   tyre_delta: 12
//! autosave:
//!   race: true
//!   directory: data
//! pit_time_loss:
//!   f1:
//!     Silverstone: 20.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EngineError, Result};
use crate::types::{SessionCategory, VehicleClass, button_flags};

/// Complete engine configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub privacy: PrivacySettings,
    pub udp_action_codes: UdpActionCodes,
    pub autosave: AutosaveSettings,
    pub race_control: RaceControlSettings,
    pub pit_time_loss: PitTimeLossTables,
    pub timing: TimingSettings,
    pub forwarding: ForwardingSettings,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacySettings {
    /// Car setups are private to the player; only route them when allowed
    pub process_car_setups: bool,
}

/// UDP action buttons (1..=12) bound to engine actions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpActionCodes {
    pub custom_marker: Option<u8>,
    pub tyre_delta: Option<u8>,
    pub hud_toggle: Option<u8>,
}

impl UdpActionCodes {
    pub const FIELDS: [&'static str; 3] = ["custom_marker", "tyre_delta", "hud_toggle"];

    /// Set a binding by field name.
    pub fn set(&mut self, field: &str, code: Option<u8>) -> Result<()> {
        if let Some(code) = code {
            validate_action_code(code)?;
        }
        let slot = match field {
            "custom_marker" => &mut self.custom_marker,
            "tyre_delta" => &mut self.tyre_delta,
            "hud_toggle" => &mut self.hud_toggle,
            other => {
                return Err(EngineError::InvalidActionCodeField { field: other.to_string() });
            }
        };
        *slot = code;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        [self.custom_marker, self.tyre_delta, self.hud_toggle]
            .into_iter()
            .flatten()
            .try_for_each(validate_action_code)
    }
}

fn validate_action_code(code: u8) -> Result<()> {
    if (1..=button_flags::UDP_ACTION_COUNT).contains(&code) {
        Ok(())
    } else {
        Err(EngineError::ActionCodeOutOfRange { code })
    }
}

/// Which session categories are saved to disk on final classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSettings {
    pub practice: bool,
    pub qualifying: bool,
    pub race: bool,
    pub time_trial: bool,
    pub directory: PathBuf,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            practice: false,
            qualifying: false,
            race: true,
            time_trial: false,
            directory: PathBuf::from("data"),
        }
    }
}

impl AutosaveSettings {
    pub fn enabled_for(&self, category: SessionCategory) -> bool {
        match category {
            SessionCategory::Practice => self.practice,
            SessionCategory::Qualifying => self.qualifying,
            SessionCategory::Race => self.race,
            SessionCategory::TimeTrial => self.time_trial,
            SessionCategory::Unknown => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceControlSettings {
    pub retain_messages: bool,
}

impl Default for RaceControlSettings {
    fn default() -> Self {
        Self { retain_messages: true }
    }
}

/// Seconds lost to a pit stop, per track name, for each vehicle class.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitTimeLossTables {
    pub f1: HashMap<String, f32>,
    pub f2: HashMap<String, f32>,
}

impl PitTimeLossTables {
    pub fn lookup(&self, class: VehicleClass, track: &str) -> Option<f32> {
        let table = match class {
            VehicleClass::F1 => &self.f1,
            VehicleClass::F2 => &self.f2,
        };
        table.get(track).copied()
    }
}

/// Intervals, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub connection_timeout_ms: u64,
    pub button_debounce_ms: u64,
    pub race_table_interval_ms: u64,
    pub stream_overlay_interval_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            connection_timeout_ms: 2_000,
            button_debounce_ms: 1_000,
            race_table_interval_ms: 100,
            stream_overlay_interval_ms: 100,
        }
    }
}

impl TimingSettings {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms)
    }

    pub fn race_table_interval(&self) -> Duration {
        Duration::from_millis(self.race_table_interval_ms)
    }

    pub fn stream_overlay_interval(&self) -> Duration {
        Duration::from_millis(self.stream_overlay_interval_ms)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingSettings {
    /// Destinations that receive a copy of every raw datagram
    pub targets: Vec<SocketAddr>,
}

impl Settings {
    /// Parse settings from a YAML document and validate them.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml_ng::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            EngineError::config(path.display().to_string(), format!("unreadable: {}", e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.udp_action_codes.validate()?;
        if self.timing.race_table_interval_ms == 0 || self.timing.stream_overlay_interval_ms == 0 {
            return Err(EngineError::config("timing", "broadcast intervals must be non-zero"));
        }
        Ok(())
    }
}
