//! Event packet and its subtypes

use serde::{Deserialize, Serialize};

use super::button::ButtonFlags;
use super::packets::PacketHeader;

/// Discrete game event.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketEvent {
    pub header: PacketHeader,
    pub details: EventDetails,
}

/// Payload of an event packet, one variant per event code.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventDetails {
    #[default]
    SessionStarted,
    SessionEnded,
    FastestLap {
        vehicle_idx: u8,
        /// Seconds
        lap_time: f32,
    },
    Retirement {
        vehicle_idx: u8,
        reason: u8,
    },
    DrsEnabled,
    DrsDisabled,
    TeamMateInPits {
        vehicle_idx: u8,
    },
    ChequeredFlag,
    RaceWinner {
        vehicle_idx: u8,
    },
    Penalty {
        penalty_type: u8,
        infringement_type: u8,
        vehicle_idx: u8,
        other_vehicle_idx: u8,
        time: u8,
        lap_num: u8,
        places_gained: u8,
    },
    SpeedTrap {
        vehicle_idx: u8,
        speed: f32,
        is_overall_fastest_in_session: bool,
        is_driver_fastest_in_session: bool,
    },
    StartLights {
        num_lights: u8,
    },
    LightsOut,
    DriveThroughServed {
        vehicle_idx: u8,
    },
    StopGoServed {
        vehicle_idx: u8,
        stop_time: f32,
    },
    Flashback {
        frame_identifier: u32,
        session_time: f32,
    },
    Buttons {
        button_status: ButtonFlags,
    },
    RedFlag,
    Overtake {
        overtaking_vehicle_idx: u8,
        being_overtaken_vehicle_idx: u8,
    },
    SafetyCar {
        safety_car_type: u8,
        event_type: u8,
    },
    Collision {
        vehicle1_idx: u8,
        vehicle2_idx: u8,
    },
}

/// Discriminator of [`EventDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    SessionStarted,
    SessionEnded,
    FastestLap,
    Retirement,
    DrsEnabled,
    DrsDisabled,
    TeamMateInPits,
    ChequeredFlag,
    RaceWinner,
    Penalty,
    SpeedTrap,
    StartLights,
    LightsOut,
    DriveThroughServed,
    StopGoServed,
    Flashback,
    Buttons,
    RedFlag,
    Overtake,
    SafetyCar,
    Collision,
}

impl EventKind {
    pub const ALL: [EventKind; 21] = [
        EventKind::SessionStarted,
        EventKind::SessionEnded,
        EventKind::FastestLap,
        EventKind::Retirement,
        EventKind::DrsEnabled,
        EventKind::DrsDisabled,
        EventKind::TeamMateInPits,
        EventKind::ChequeredFlag,
        EventKind::RaceWinner,
        EventKind::Penalty,
        EventKind::SpeedTrap,
        EventKind::StartLights,
        EventKind::LightsOut,
        EventKind::DriveThroughServed,
        EventKind::StopGoServed,
        EventKind::Flashback,
        EventKind::Buttons,
        EventKind::RedFlag,
        EventKind::Overtake,
        EventKind::SafetyCar,
        EventKind::Collision,
    ];

    /// Position of this kind in [`EventKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Four-letter event code used on the wire.
    pub fn code(self) -> &'static str {
        match self {
            EventKind::SessionStarted => "SSTA",
            EventKind::SessionEnded => "SEND",
            EventKind::FastestLap => "FTLP",
            EventKind::Retirement => "RTMT",
            EventKind::DrsEnabled => "DRSE",
            EventKind::DrsDisabled => "DRSD",
            EventKind::TeamMateInPits => "TMPT",
            EventKind::ChequeredFlag => "CHQF",
            EventKind::RaceWinner => "RCWN",
            EventKind::Penalty => "PENA",
            EventKind::SpeedTrap => "SPTP",
            EventKind::StartLights => "STLG",
            EventKind::LightsOut => "LGOT",
            EventKind::DriveThroughServed => "DTSV",
            EventKind::StopGoServed => "SGSV",
            EventKind::Flashback => "FLBK",
            EventKind::Buttons => "BUTN",
            EventKind::RedFlag => "RDFL",
            EventKind::Overtake => "OVTK",
            EventKind::SafetyCar => "SCAR",
            EventKind::Collision => "COLL",
        }
    }
}

impl EventDetails {
    pub fn kind(&self) -> EventKind {
        match self {
            EventDetails::SessionStarted => EventKind::SessionStarted,
            EventDetails::SessionEnded => EventKind::SessionEnded,
            EventDetails::FastestLap { .. } => EventKind::FastestLap,
            EventDetails::Retirement { .. } => EventKind::Retirement,
            EventDetails::DrsEnabled => EventKind::DrsEnabled,
            EventDetails::DrsDisabled => EventKind::DrsDisabled,
            EventDetails::TeamMateInPits { .. } => EventKind::TeamMateInPits,
            EventDetails::ChequeredFlag => EventKind::ChequeredFlag,
            EventDetails::RaceWinner { .. } => EventKind::RaceWinner,
            EventDetails::Penalty { .. } => EventKind::Penalty,
            EventDetails::SpeedTrap { .. } => EventKind::SpeedTrap,
            EventDetails::StartLights { .. } => EventKind::StartLights,
            EventDetails::LightsOut => EventKind::LightsOut,
            EventDetails::DriveThroughServed { .. } => EventKind::DriveThroughServed,
            EventDetails::StopGoServed { .. } => EventKind::StopGoServed,
            EventDetails::Flashback { .. } => EventKind::Flashback,
            EventDetails::Buttons { .. } => EventKind::Buttons,
            EventDetails::RedFlag => EventKind::RedFlag,
            EventDetails::Overtake { .. } => EventKind::Overtake,
            EventDetails::SafetyCar { .. } => EventKind::SafetyCar,
            EventDetails::Collision { .. } => EventKind::Collision,
        }
    }

    /// Car the event is primarily about, when it names one.
    pub fn vehicle_idx(&self) -> Option<u8> {
        match self {
            EventDetails::FastestLap { vehicle_idx, .. }
            | EventDetails::Retirement { vehicle_idx, .. }
            | EventDetails::TeamMateInPits { vehicle_idx }
            | EventDetails::RaceWinner { vehicle_idx }
            | EventDetails::Penalty { vehicle_idx, .. }
            | EventDetails::SpeedTrap { vehicle_idx, .. }
            | EventDetails::DriveThroughServed { vehicle_idx }
            | EventDetails::StopGoServed { vehicle_idx, .. } => Some(*vehicle_idx),
            EventDetails::Overtake { overtaking_vehicle_idx, .. } => Some(*overtaking_vehicle_idx),
            EventDetails::Collision { vehicle1_idx, .. } => Some(*vehicle1_idx),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn event_kind_indices_match_table_order() {
        for (position, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn event_codes_are_unique() {
        let codes: HashSet<_> = EventKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), EventKind::ALL.len());
    }
}
