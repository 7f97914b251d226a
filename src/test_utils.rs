//! Packet builders shared by unit tests, integration tests and benchmarks
//!
//! Every builder produces a plausible, fully self-describing packet for a
//! given session UID so tests only spell out the fields they care about.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::{
    EventDetails, FinalClassificationData, InboundFrame, LapData, LapHistoryData, Packet,
    PacketEvent, PacketFinalClassification, PacketHeader, PacketLapData, PacketParticipants,
    PacketSession, PacketSessionHistory, ParticipantData, ResultStatus, SessionType, TrackId,
};

/// Silverstone
pub const TEST_TRACK: TrackId = TrackId(7);

/// Silverstone length in metres
pub const TEST_TRACK_LENGTH: u16 = 5891;

/// Header for the 2024 protocol with the player in car 0.
pub fn header(session_uid: u64) -> PacketHeader {
    PacketHeader {
        packet_format: 2024,
        game_year: 24,
        session_uid,
        player_car_index: 0,
        secondary_player_car_index: 255,
        ..Default::default()
    }
}

/// Offline session of the given type at [`TEST_TRACK`].
pub fn session(session_uid: u64, session_type: SessionType, duration: u16) -> PacketSession {
    PacketSession {
        header: header(session_uid),
        total_laps: 5,
        track_length: TEST_TRACK_LENGTH,
        session_type,
        track_id: TEST_TRACK,
        session_time_left: duration,
        session_duration: duration,
        pit_speed_limit: 80,
        network_game: false,
        ..Default::default()
    }
}

/// Participants named in car-index order; car 0 is human, the rest AI.
pub fn participants(session_uid: u64, names: &[&str]) -> PacketParticipants {
    PacketParticipants {
        header: header(session_uid),
        num_active_cars: names.len() as u8,
        participants: names
            .iter()
            .enumerate()
            .map(|(idx, name)| ParticipantData {
                ai_controlled: idx != 0,
                name: name.to_string(),
                team: format!("Team {}", idx / 2),
                race_number: idx as u8 + 1,
                ..Default::default()
            })
            .collect(),
    }
}

/// Active car at `position` on `lap`.
pub fn lap_row(position: u8, lap: u8) -> LapData {
    LapData {
        car_position: position,
        current_lap_num: lap,
        grid_position: position,
        result_status: ResultStatus::Active,
        speed_trap_fastest_lap: 255,
        ..Default::default()
    }
}

pub fn lap_data(session_uid: u64, rows: Vec<LapData>) -> PacketLapData {
    PacketLapData {
        header: header(session_uid),
        car_lap_data: rows,
        time_trial_pb_car_idx: 255,
        time_trial_rival_car_idx: 255,
    }
}

/// History with one recorded lap per time; the best lap points at the minimum.
pub fn session_history(session_uid: u64, car: u8, lap_times: &[u32]) -> PacketSessionHistory {
    let lap_history_data: Vec<_> = lap_times
        .iter()
        .map(|time| LapHistoryData {
            lap_time_ms: *time,
            sector1_time_ms: time / 3,
            sector2_time_ms: time / 3,
            sector3_time_ms: time - 2 * (time / 3),
            lap_valid_bit_flags: 0x0F,
        })
        .collect();
    let best = lap_times
        .iter()
        .enumerate()
        .filter(|(_, time)| **time > 0)
        .min_by_key(|(idx, time)| (**time, *idx))
        .map(|(idx, _)| idx as u8 + 1)
        .unwrap_or(0);
    PacketSessionHistory {
        header: header(session_uid),
        car_idx: car,
        num_laps: lap_times.len() as u8,
        best_lap_time_lap_num: best,
        best_sector1_lap_num: best,
        best_sector2_lap_num: best,
        best_sector3_lap_num: best,
        lap_history_data,
        ..Default::default()
    }
}

/// Classification with the given finishing positions in car-index order.
pub fn final_classification(session_uid: u64, positions: &[u8]) -> PacketFinalClassification {
    PacketFinalClassification {
        header: header(session_uid),
        num_cars: positions.len() as u8,
        classification_data: positions
            .iter()
            .map(|position| FinalClassificationData {
                position: *position,
                num_laps: 5,
                grid_position: *position,
                result_status: ResultStatus::Finished,
                best_lap_time_ms: 90_000 + u32::from(*position) * 100,
                total_race_time: 450.0 + f64::from(*position),
                ..Default::default()
            })
            .collect(),
    }
}

pub fn event(session_uid: u64, details: EventDetails) -> PacketEvent {
    PacketEvent { header: header(session_uid), details }
}

/// Wrap a packet in a frame with a small raw payload.
pub fn frame(packet: Packet) -> InboundFrame {
    let raw = packet.header().session_uid.to_le_bytes().to_vec();
    InboundFrame::new(raw, packet)
}

/// A short offline race: session, participants, three laps of lap data with
/// session history, and the final classification.
pub fn race_weekend(session_uid: u64, names: &[&str]) -> Vec<InboundFrame> {
    let mut frames = vec![
        frame(Packet::Session(session(session_uid, SessionType::Race, 3600))),
        frame(Packet::Participants(participants(session_uid, names))),
    ];
    for lap in 1..=3u8 {
        let rows = (0..names.len()).map(|idx| lap_row(idx as u8 + 1, lap)).collect();
        frames.push(frame(Packet::LapData(lap_data(session_uid, rows))));
        for car in 0..names.len() {
            let times: Vec<u32> =
                (1..lap).map(|done| 90_000 + u32::from(done) * 10 + car as u32 * 100).collect();
            frames.push(frame(Packet::SessionHistory(session_history(
                session_uid,
                car as u8,
                &times,
            ))));
        }
    }
    let positions: Vec<u8> = (1..=names.len() as u8).collect();
    frames.push(frame(Packet::FinalClassification(final_classification(session_uid, &positions))));
    frames
}
