//! Post-race dump
//!
//! The document written to disk after the final classification (or on a
//! manual save). Tyre-stint history has two shapes: protocol formats before
//! 2024 only carry compounds and end laps, later formats add stint bounds and
//! the wear measured at the end of each stint.

use chrono::{DateTime, Local};
use serde::Serialize;

use super::lap_time_text;
use crate::state::{
    CustomMarkerEntry, DriverData, OvertakeRecord, OvertakeSummary, RaceControlMessage,
    SessionState, TyreWear,
};
use crate::types::{ActualTyreCompound, Formula, ResultStatus, SessionType, VisualTyreCompound};

/// Protocol format from which stint bounds and wear are reported.
const STINT_V2_FORMAT: u16 = 2024;

/// End lap the game reports for a stint that is still running.
const CURRENT_STINT_END_LAP: u8 = 255;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpSessionInfo {
    pub session_uid: Option<u64>,
    pub track: String,
    pub session_type: SessionType,
    pub formula: Formula,
    pub packet_format: Option<u16>,
    pub total_laps: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRow {
    pub index: usize,
    pub position: Option<u8>,
    pub name: String,
    pub team: String,
    pub grid_position: Option<u8>,
    pub num_laps: Option<u8>,
    pub points: u8,
    pub num_pit_stops: u8,
    pub result_status: ResultStatus,
    pub best_lap_ms: Option<u32>,
    pub best_lap: String,
    /// Seconds, without penalties
    pub total_race_time: Option<f64>,
    pub penalties_sec: u8,
    pub num_penalties: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LapPosition {
    pub lap: u8,
    pub position: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionHistory {
    pub index: usize,
    pub name: String,
    pub positions: Vec<LapPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintV1 {
    pub end_lap: u8,
    pub tyre_actual_compound: ActualTyreCompound,
    pub tyre_visual_compound: VisualTyreCompound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintV2 {
    pub start_lap: u8,
    pub end_lap: u8,
    pub stint_length: u8,
    pub tyre_actual_compound: ActualTyreCompound,
    pub tyre_visual_compound: VisualTyreCompound,
    pub tyre_wear: Option<TyreWear>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TyreStintHistory {
    V1(Vec<StintV1>),
    V2(Vec<StintV2>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverStints {
    pub index: usize,
    pub name: String,
    pub stints: TyreStintHistory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedTrapRecord {
    pub index: usize,
    pub name: String,
    pub speed_kmph: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordHolder {
    pub index: usize,
    pub name: String,
    pub time_ms: u32,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintRecord {
    pub index: usize,
    pub name: String,
    pub laps: u8,
    pub tyre_visual_compound: VisualTyreCompound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Records {
    pub fastest_lap: Option<RecordHolder>,
    pub fastest_sectors: [Option<RecordHolder>; 3],
    pub longest_stint: Option<StintRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvertakesSection {
    pub summary: OvertakeSummary,
    pub records: Vec<OvertakeRecord>,
}

/// Provenance of a dump file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub session_uid: Option<u64>,
    pub timestamp: String,
    pub timezone: String,
    pub packet_count: u64,
    pub file_name: String,
    pub reason: String,
}

impl DebugInfo {
    pub fn new(state: &SessionState, now: DateTime<Local>, file_name: &str, reason: &str) -> Self {
        Self {
            session_uid: state.session.session_uid,
            timestamp: now.to_rfc3339(),
            timezone: now.offset().to_string(),
            packet_count: state.packet_count(),
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRaceDump {
    pub session_info: DumpSessionInfo,
    pub classification: Vec<ClassificationRow>,
    pub position_history: Vec<PositionHistory>,
    pub tyre_stint_history: Vec<DriverStints>,
    pub speed_trap_records: Vec<SpeedTrapRecord>,
    pub records: Records,
    pub overtakes: OvertakesSection,
    pub custom_markers: Vec<CustomMarkerEntry>,
    pub race_control: Vec<RaceControlMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Stint bounds independent of the output schema.
struct Stint {
    start_lap: u8,
    end_lap: u8,
    actual: ActualTyreCompound,
    visual: VisualTyreCompound,
}

impl PostRaceDump {
    /// Build the dump from the current state. Pure; callers mark the race
    /// completed.
    pub fn build(state: &SessionState) -> Self {
        let session = &state.session;
        let drivers: Vec<&DriverData> = state.drivers().collect();
        let v2 = session.packet_format.is_some_and(|format| format >= STINT_V2_FORMAT);

        let mut classification: Vec<_> = drivers.iter().map(|d| classification_row(d)).collect();
        classification.sort_by_key(|row| (row.position.is_none(), row.position, row.index));

        let stints: Vec<(usize, &str, Vec<Stint>)> = drivers
            .iter()
            .map(|driver| (driver.index, driver.name().unwrap_or_default(), stints_of(driver)))
            .collect();

        let tyre_stint_history = stints
            .iter()
            .zip(&drivers)
            .map(|((index, name, stints), driver)| DriverStints {
                index: *index,
                name: name.to_string(),
                stints: if v2 { stints_v2(driver, stints) } else { stints_v1(stints) },
            })
            .collect();

        let longest_stint = stints
            .iter()
            .flat_map(|(index, name, stints)| stints.iter().map(move |stint| (*index, *name, stint)))
            .map(|(index, name, stint)| StintRecord {
                index,
                name: name.to_string(),
                laps: stint.end_lap.saturating_sub(stint.start_lap).saturating_add(1),
                tyre_visual_compound: stint.visual,
            })
            .max_by_key(|record| (record.laps, std::cmp::Reverse(record.index)));

        let mut speed_trap_records: Vec<_> = drivers
            .iter()
            .filter_map(|driver| {
                Some(SpeedTrapRecord {
                    index: driver.index,
                    name: driver.name()?.to_string(),
                    speed_kmph: driver.lap.speed_trap_kmph?,
                })
            })
            .collect();
        speed_trap_records.sort_by(|a, b| b.speed_kmph.total_cmp(&a.speed_kmph));

        let fastest_lap = state
            .fastest_lap_holder()
            .and_then(|idx| state.driver(idx))
            .and_then(|driver| record_holder(driver, driver.lap.best_lap_ms));
        let fastest_sectors = std::array::from_fn(|sector| {
            let best = state.fastest_sectors()[sector]?;
            drivers
                .iter()
                .find(|driver| driver.lap.personal_best_sectors[sector] == Some(best))
                .and_then(|driver| record_holder(driver, Some(best)))
        });

        Self {
            session_info: DumpSessionInfo {
                session_uid: session.session_uid,
                track: session.track().map(|t| t.name().to_string()).unwrap_or_default(),
                session_type: session.session_type().unwrap_or_default(),
                formula: session.formula().unwrap_or_default(),
                packet_format: session.packet_format,
                total_laps: session.total_laps(),
            },
            classification,
            position_history: drivers
                .iter()
                .map(|driver| PositionHistory {
                    index: driver.index,
                    name: driver.name().unwrap_or_default().to_string(),
                    positions: driver
                        .snapshots
                        .values()
                        .map(|snapshot| LapPosition { lap: snapshot.lap, position: snapshot.position })
                        .collect(),
                })
                .collect(),
            tyre_stint_history,
            speed_trap_records,
            records: Records { fastest_lap, fastest_sectors, longest_stint },
            overtakes: OvertakesSection {
                summary: state.overtakes().summary(),
                records: state.overtakes().records().to_vec(),
            },
            custom_markers: state.custom_markers().entries().to_vec(),
            race_control: state.race_control().messages().to_vec(),
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: DebugInfo) -> Self {
        self.debug = Some(debug);
        self
    }
}

/// `<session type>_<track>_<YYYY_MM_DD_HH_MM_SS>.json` with spaces replaced.
pub fn dump_file_name(state: &SessionState, now: DateTime<Local>) -> String {
    let session_type = state.session.session_type().unwrap_or_default().label();
    let track = state.session.track().map(|t| t.name()).unwrap_or("Unknown");
    format!(
        "{}_{}_{}.json",
        session_type.replace(' ', "_"),
        track.replace(' ', "_"),
        now.format("%Y_%m_%d_%H_%M_%S")
    )
}

fn classification_row(driver: &DriverData) -> ClassificationRow {
    let identity = driver.identity.as_ref();
    let lap = &driver.lap;
    match &driver.packets.final_classification {
        Some(fc) => ClassificationRow {
            index: driver.index,
            position: (fc.position != 0).then_some(fc.position),
            name: identity.map(|i| i.name.clone()).unwrap_or_default(),
            team: identity.map(|i| i.team.clone()).unwrap_or_default(),
            grid_position: Some(fc.grid_position),
            num_laps: Some(fc.num_laps),
            points: fc.points,
            num_pit_stops: fc.num_pit_stops,
            result_status: fc.result_status,
            best_lap_ms: (fc.best_lap_time_ms > 0).then_some(fc.best_lap_time_ms),
            best_lap: lap_time_text((fc.best_lap_time_ms > 0).then_some(fc.best_lap_time_ms)),
            total_race_time: Some(fc.total_race_time),
            penalties_sec: fc.penalties_time,
            num_penalties: fc.num_penalties,
        },
        None => ClassificationRow {
            index: driver.index,
            position: lap.position,
            name: identity.map(|i| i.name.clone()).unwrap_or_default(),
            team: identity.map(|i| i.team.clone()).unwrap_or_default(),
            grid_position: lap.grid_position,
            num_laps: lap.current_lap.map(|l| l.saturating_sub(1)),
            points: 0,
            num_pit_stops: lap.num_pit_stops,
            result_status: lap.result_status,
            best_lap_ms: lap.best_lap_ms,
            best_lap: lap_time_text(lap.best_lap_ms),
            total_race_time: None,
            penalties_sec: lap.penalties_sec,
            num_penalties: 0,
        },
    }
}

fn record_holder(driver: &DriverData, time_ms: Option<u32>) -> Option<RecordHolder> {
    let time_ms = time_ms?;
    Some(RecordHolder {
        index: driver.index,
        name: driver.name()?.to_string(),
        time_ms,
        time: crate::format::lap_time(time_ms),
    })
}

/// Stints from the final classification when present, else from session history.
fn stints_of(driver: &DriverData) -> Vec<Stint> {
    let raw: Vec<(u8, ActualTyreCompound, VisualTyreCompound)> =
        match &driver.packets.final_classification {
            Some(fc) if fc.num_tyre_stints > 0 => fc
                .tyre_stints_end_laps
                .iter()
                .zip(&fc.tyre_stints_actual)
                .zip(&fc.tyre_stints_visual)
                .take(usize::from(fc.num_tyre_stints))
                .map(|((end, actual), visual)| (*end, *actual, *visual))
                .collect(),
            _ => driver
                .tyre
                .stint_history
                .iter()
                .map(|s| (s.end_lap, s.tyre_actual_compound, s.tyre_visual_compound))
                .collect(),
        };

    let last_lap = driver
        .packets
        .final_classification
        .as_ref()
        .map(|fc| fc.num_laps)
        .or(driver.lap.current_lap)
        .unwrap_or(0);

    let mut start_lap = 1;
    raw.into_iter()
        .map(|(end_lap, actual, visual)| {
            let end_lap = if end_lap == CURRENT_STINT_END_LAP { last_lap } else { end_lap };
            let stint = Stint { start_lap, end_lap, actual, visual };
            start_lap = end_lap.saturating_add(1);
            stint
        })
        .collect()
}

fn stints_v1(stints: &[Stint]) -> TyreStintHistory {
    TyreStintHistory::V1(
        stints
            .iter()
            .map(|s| StintV1 {
                end_lap: s.end_lap,
                tyre_actual_compound: s.actual,
                tyre_visual_compound: s.visual,
            })
            .collect(),
    )
}

fn stints_v2(driver: &DriverData, stints: &[Stint]) -> TyreStintHistory {
    TyreStintHistory::V2(
        stints
            .iter()
            .map(|s| StintV2 {
                start_lap: s.start_lap,
                end_lap: s.end_lap,
                stint_length: s.end_lap.saturating_sub(s.start_lap).saturating_add(1),
                tyre_actual_compound: s.actual,
                tyre_visual_compound: s.visual,
                tyre_wear: driver
                    .tyre
                    .wear_history
                    .iter()
                    .find(|entry| entry.lap == s.end_lap)
                    .map(|entry| entry.wear),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PitTimeLossTables;
    use crate::test_utils::{final_classification, lap_data, lap_row, participants, session};
    use crate::types::{LapData, PacketFinalClassification, PacketHeader};
    use chrono::TimeZone;
    use std::sync::Arc;

    const UID: u64 = 77;

    fn finished_race(packet_format: u16) -> SessionState {
        let mut state = SessionState::new(Arc::new(PitTimeLossTables::default()), true);
        let mut race = session(UID, SessionType::Race, 3600);
        race.header.packet_format = packet_format;
        state.process_session_update(&race);
        state.process_participants(&participants(UID, &["A", "B", "C"]));
        let mut rows: Vec<LapData> = (0..3).map(|idx| lap_row(idx + 1, 1)).collect();
        rows[0].speed_trap_fastest_speed = 318.2;
        rows[2].speed_trap_fastest_speed = 322.9;
        state.process_lap_data(&lap_data(UID, rows));

        let mut fc: PacketFinalClassification = final_classification(UID, &[1, 2, 3]);
        fc.header = PacketHeader { packet_format, ..fc.header };
        for data in &mut fc.classification_data {
            data.num_tyre_stints = 2;
            data.tyre_stints_end_laps = vec![2, 255];
            data.tyre_stints_actual = vec![ActualTyreCompound::C3, ActualTyreCompound::C2];
            data.tyre_stints_visual = vec![VisualTyreCompound::Medium, VisualTyreCompound::Hard];
        }
        state.process_final_classification(&fc);
        state
    }

    #[test]
    fn stint_schema_follows_packet_format() {
        let legacy = PostRaceDump::build(&finished_race(2023));
        assert!(matches!(legacy.tyre_stint_history[0].stints, TyreStintHistory::V1(_)));

        let current = PostRaceDump::build(&finished_race(2024));
        let TyreStintHistory::V2(stints) = &current.tyre_stint_history[0].stints else {
            panic!("expected v2 stints");
        };
        assert_eq!(stints.len(), 2);
        assert_eq!((stints[0].start_lap, stints[0].end_lap, stints[0].stint_length), (1, 2, 2));
        assert_eq!((stints[1].start_lap, stints[1].end_lap, stints[1].stint_length), (3, 5, 3));

        let longest = current.records.longest_stint.expect("stints exist");
        assert_eq!((longest.index, longest.laps), (0, 3));
    }

    #[test]
    fn speed_traps_sorted_descending() {
        let dump = PostRaceDump::build(&finished_race(2024));
        let names: Vec<_> = dump.speed_trap_records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }

    #[test]
    fn classification_uses_final_positions() {
        let dump = PostRaceDump::build(&finished_race(2024));
        let positions: Vec<_> = dump.classification.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(dump.classification[0].num_laps, Some(5));
        assert!(dump.debug.is_none());
    }

    #[test]
    fn file_name_and_debug_block() {
        let state = finished_race(2024);
        let now = Local.with_ymd_and_hms(2025, 7, 6, 15, 4, 5).single().expect("valid local time");
        let name = dump_file_name(&state, now);
        assert_eq!(name, "Race_Silverstone_2025_07_06_15_04_05.json");

        let dump = PostRaceDump::build(&state).with_debug(DebugInfo::new(&state, now, &name, "Final Classification"));
        let json = serde_json::to_value(&dump).expect("serializable");
        assert_eq!(json["debug"]["file_name"], name.as_str());
        assert_eq!(json["debug"]["session_uid"], UID);
        assert_eq!(json["debug"]["reason"], "Final Classification");
    }
}
