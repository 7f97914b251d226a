//! Enumerations carried by decoded packets
//!
//! The decoder collaborator resolves raw protocol codes into these types. The
//! `From<u8>` conversions follow the current protocol numbering and keep
//! anything unrecognised in an `Unknown` variant instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of cars the game reports in any per-car array.
pub const MAX_CARS: usize = 22;

/// Session type as reported by the session packet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[default]
    Unknown,
    Practice1,
    Practice2,
    Practice3,
    ShortPractice,
    Qualifying1,
    Qualifying2,
    Qualifying3,
    ShortQualifying,
    OneShotQualifying,
    SprintShootout1,
    SprintShootout2,
    SprintShootout3,
    ShortSprintShootout,
    OneShotSprintShootout,
    Race,
    Race2,
    Race3,
    TimeTrial,
}

/// Coarse grouping of session types, used for autosave policy and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCategory {
    Practice,
    Qualifying,
    Race,
    TimeTrial,
    Unknown,
}

impl SessionType {
    pub fn category(self) -> SessionCategory {
        use SessionType::*;
        match self {
            Practice1 | Practice2 | Practice3 | ShortPractice => SessionCategory::Practice,
            Qualifying1 | Qualifying2 | Qualifying3 | ShortQualifying | OneShotQualifying
            | SprintShootout1 | SprintShootout2 | SprintShootout3 | ShortSprintShootout
            | OneShotSprintShootout => SessionCategory::Qualifying,
            Race | Race2 | Race3 => SessionCategory::Race,
            TimeTrial => SessionCategory::TimeTrial,
            Unknown => SessionCategory::Unknown,
        }
    }

    pub fn is_race(self) -> bool {
        self.category() == SessionCategory::Race
    }

    pub fn is_qualifying(self) -> bool {
        self.category() == SessionCategory::Qualifying
    }

    pub fn is_time_trial(self) -> bool {
        self == SessionType::TimeTrial
    }

    /// Human-readable label, as shown in the UI and used in dump file names.
    pub fn label(self) -> &'static str {
        use SessionType::*;
        match self {
            Unknown => "Unknown",
            Practice1 => "Practice 1",
            Practice2 => "Practice 2",
            Practice3 => "Practice 3",
            ShortPractice => "Short Practice",
            Qualifying1 => "Qualifying 1",
            Qualifying2 => "Qualifying 2",
            Qualifying3 => "Qualifying 3",
            ShortQualifying => "Short Qualifying",
            OneShotQualifying => "One Shot Qualifying",
            SprintShootout1 => "Sprint Shootout 1",
            SprintShootout2 => "Sprint Shootout 2",
            SprintShootout3 => "Sprint Shootout 3",
            ShortSprintShootout => "Short Sprint Shootout",
            OneShotSprintShootout => "One Shot Sprint Shootout",
            Race => "Race",
            Race2 => "Race 2",
            Race3 => "Race 3",
            TimeTrial => "Time Trial",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<u8> for SessionType {
    fn from(code: u8) -> Self {
        use SessionType::*;
        match code {
            1 => Practice1,
            2 => Practice2,
            3 => Practice3,
            4 => ShortPractice,
            5 => Qualifying1,
            6 => Qualifying2,
            7 => Qualifying3,
            8 => ShortQualifying,
            9 => OneShotQualifying,
            10 => SprintShootout1,
            11 => SprintShootout2,
            12 => SprintShootout3,
            13 => ShortSprintShootout,
            14 => OneShotSprintShootout,
            15 => Race,
            16 => Race2,
            17 => Race3,
            18 => TimeTrial,
            _ => Unknown,
        }
    }
}

/// Per-car result status from lap data and final classification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultStatus {
    #[default]
    Invalid,
    Inactive,
    Active,
    Finished,
    DidNotFinish,
    Disqualified,
    NotClassified,
    Retired,
}

impl ResultStatus {
    /// Invalid and inactive slots carry no meaningful timing data.
    pub fn is_participating(self) -> bool {
        !matches!(self, ResultStatus::Invalid | ResultStatus::Inactive)
    }

    pub fn is_dnf(self) -> bool {
        matches!(self, ResultStatus::DidNotFinish | ResultStatus::Retired)
    }

    pub fn is_dsq(self) -> bool {
        self == ResultStatus::Disqualified
    }
}

impl From<u8> for ResultStatus {
    fn from(code: u8) -> Self {
        use ResultStatus::*;
        match code {
            1 => Inactive,
            2 => Active,
            3 => Finished,
            4 => DidNotFinish,
            5 => Disqualified,
            6 => NotClassified,
            7 => Retired,
            _ => Invalid,
        }
    }
}

/// Pit status of a car in lap data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitStatus {
    #[default]
    None,
    Pitting,
    InPitArea,
}

impl From<u8> for PitStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => PitStatus::Pitting,
            2 => PitStatus::InPitArea,
            _ => PitStatus::None,
        }
    }
}

/// Driver status in lap data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverStatus {
    #[default]
    InGarage,
    FlyingLap,
    InLap,
    OutLap,
    OnTrack,
}

impl From<u8> for DriverStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => DriverStatus::FlyingLap,
            2 => DriverStatus::InLap,
            3 => DriverStatus::OutLap,
            4 => DriverStatus::OnTrack,
            _ => DriverStatus::InGarage,
        }
    }
}

/// Safety car deployment state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafetyCarStatus {
    #[default]
    NoSafetyCar,
    FullSafetyCar,
    VirtualSafetyCar,
    FormationLap,
}

impl From<u8> for SafetyCarStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => SafetyCarStatus::FullSafetyCar,
            2 => SafetyCarStatus::VirtualSafetyCar,
            3 => SafetyCarStatus::FormationLap,
            _ => SafetyCarStatus::NoSafetyCar,
        }
    }
}

/// Weather condition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    LightCloud,
    Overcast,
    LightRain,
    HeavyRain,
    Storm,
}

impl From<u8> for Weather {
    fn from(code: u8) -> Self {
        match code {
            1 => Weather::LightCloud,
            2 => Weather::Overcast,
            3 => Weather::LightRain,
            4 => Weather::HeavyRain,
            5 => Weather::Storm,
            _ => Weather::Clear,
        }
    }
}

/// Vehicle class used to select the pit-time-loss table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    F1,
    F2,
}

/// Formula / car category of the session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    #[default]
    F1Modern,
    F1Classic,
    F2,
    F1Generic,
    Beta,
    Esports,
    F1World,
    F1Elimination,
    Unknown(u8),
}

impl Formula {
    pub fn vehicle_class(self) -> VehicleClass {
        match self {
            Formula::F2 => VehicleClass::F2,
            _ => VehicleClass::F1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Formula::F1Modern => "F1 Modern",
            Formula::F1Classic => "F1 Classic",
            Formula::F2 => "F2",
            Formula::F1Generic => "F1 Generic",
            Formula::Beta => "Beta",
            Formula::Esports => "Esports",
            Formula::F1World => "F1 World",
            Formula::F1Elimination => "F1 Elimination",
            Formula::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for Formula {
    fn from(code: u8) -> Self {
        match code {
            0 => Formula::F1Modern,
            1 => Formula::F1Classic,
            2 => Formula::F2,
            3 => Formula::F1Generic,
            4 => Formula::Beta,
            6 => Formula::Esports,
            8 => Formula::F1World,
            9 => Formula::F1Elimination,
            other => Formula::Unknown(other),
        }
    }
}

/// Track identifier with a display-name lookup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub i8);

impl TrackId {
    /// Display name for the track. Unknown IDs return `"Unknown"`.
    pub fn name(self) -> &'static str {
        const NAMES: &[&str] = &[
            "Melbourne",
            "Paul Ricard",
            "Shanghai",
            "Sakhir",
            "Catalunya",
            "Monaco",
            "Montreal",
            "Silverstone",
            "Hockenheim",
            "Hungaroring",
            "Spa",
            "Monza",
            "Singapore",
            "Suzuka",
            "Abu Dhabi",
            "Texas",
            "Brazil",
            "Austria",
            "Sochi",
            "Mexico",
            "Baku",
            "Sakhir Short",
            "Silverstone Short",
            "Texas Short",
            "Suzuka Short",
            "Hanoi",
            "Zandvoort",
            "Imola",
            "Portimao",
            "Jeddah",
            "Miami",
            "Las Vegas",
            "Losail",
            "Silverstone Reverse",
            "Austria Reverse",
            "Zandvoort Reverse",
        ];
        usize::try_from(self.0).ok().and_then(|idx| NAMES.get(idx)).copied().unwrap_or("Unknown")
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad tyre category used for the tyre-delta advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TyreCategory {
    Slick,
    Intermediate,
    Wet,
}

impl TyreCategory {
    pub const ALL: [TyreCategory; 3] =
        [TyreCategory::Slick, TyreCategory::Intermediate, TyreCategory::Wet];

    pub fn label(self) -> &'static str {
        match self {
            TyreCategory::Slick => "Slick",
            TyreCategory::Intermediate => "Intermediate",
            TyreCategory::Wet => "Wet",
        }
    }
}

/// Physical tyre compound fitted to the car.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActualTyreCompound {
    C6,
    C5,
    C4,
    C3,
    C2,
    C1,
    C0,
    Intermediate,
    Wet,
    ClassicDry,
    ClassicWet,
    F2SuperSoft,
    F2Soft,
    F2Medium,
    F2Hard,
    F2Wet,
    #[default]
    Unknown,
}

impl ActualTyreCompound {
    pub fn category(self) -> Option<TyreCategory> {
        use ActualTyreCompound::*;
        match self {
            C6 | C5 | C4 | C3 | C2 | C1 | C0 | ClassicDry | F2SuperSoft | F2Soft | F2Medium
            | F2Hard => Some(TyreCategory::Slick),
            Intermediate => Some(TyreCategory::Intermediate),
            Wet | ClassicWet | F2Wet => Some(TyreCategory::Wet),
            Unknown => None,
        }
    }
}

impl From<u8> for ActualTyreCompound {
    fn from(code: u8) -> Self {
        use ActualTyreCompound::*;
        match code {
            22 => C6,
            16 => C5,
            17 => C4,
            18 => C3,
            19 => C2,
            20 => C1,
            21 => C0,
            7 => Intermediate,
            8 => Wet,
            9 => ClassicDry,
            10 => ClassicWet,
            11 => F2SuperSoft,
            12 => F2Soft,
            13 => F2Medium,
            14 => F2Hard,
            15 => F2Wet,
            _ => Unknown,
        }
    }
}

/// Compound as displayed on the car (soft/medium/hard/inter/wet).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualTyreCompound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    SuperSoft,
    #[default]
    Unknown,
}

impl VisualTyreCompound {
    pub fn label(self) -> &'static str {
        match self {
            VisualTyreCompound::Soft => "Soft",
            VisualTyreCompound::Medium => "Medium",
            VisualTyreCompound::Hard => "Hard",
            VisualTyreCompound::Intermediate => "Intermediate",
            VisualTyreCompound::Wet => "Wet",
            VisualTyreCompound::SuperSoft => "Super Soft",
            VisualTyreCompound::Unknown => "Unknown",
        }
    }
}

impl From<u8> for VisualTyreCompound {
    fn from(code: u8) -> Self {
        match code {
            16 => VisualTyreCompound::Soft,
            17 => VisualTyreCompound::Medium,
            18 => VisualTyreCompound::Hard,
            7 => VisualTyreCompound::Intermediate,
            8 | 15 => VisualTyreCompound::Wet,
            19 => VisualTyreCompound::SuperSoft,
            20 => VisualTyreCompound::Soft,
            21 => VisualTyreCompound::Medium,
            22 => VisualTyreCompound::Hard,
            _ => VisualTyreCompound::Unknown,
        }
    }
}

/// Whether a participant shares telemetry publicly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetrySetting {
    #[default]
    Restricted,
    Public,
}
