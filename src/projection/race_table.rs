//! Periodic race-table document

use serde::Serialize;

use super::{ers_percent, lap_time_text};
use crate::state::{DamageSummary, DriverData, PoleLap, SessionState};
use crate::types::{
    Formula, ResultStatus, SafetyCarStatus, SessionType, TimeTrialDataSet, VisualTyreCompound,
    WeatherForecastSample,
};

/// Session-wide fields shared by both table shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFields {
    pub session_uid: Option<u64>,
    pub track: String,
    pub session_type: SessionType,
    pub formula: Formula,
    pub packet_format: Option<u16>,
    pub total_laps: Option<u8>,
    pub current_lap: Option<u8>,
    pub safety_car_status: Option<SafetyCarStatus>,
    pub pit_speed_limit: Option<u8>,
    pub pit_time_loss: Option<f32>,
    pub weather_forecast: Vec<WeatherForecastSample>,
    pub is_spectating: bool,
    pub player_index: Option<usize>,
    pub pole_lap: Option<PoleLap>,
}

impl SessionFields {
    fn build(state: &SessionState) -> Self {
        let session = &state.session;
        let leader_lap = state
            .drivers()
            .find(|driver| driver.lap.position == Some(1))
            .and_then(|driver| driver.lap.current_lap);
        Self {
            session_uid: session.session_uid,
            track: session.track().map(|t| t.name().to_string()).unwrap_or_default(),
            session_type: session.session_type().unwrap_or_default(),
            formula: session.formula().unwrap_or_default(),
            packet_format: session.packet_format,
            total_laps: session.total_laps(),
            current_lap: leader_lap,
            safety_car_status: session.safety_car_status(),
            pit_speed_limit: session.pit_speed_limit(),
            pit_time_loss: session.pit_time_loss(),
            weather_forecast: session.weather_forecast().to_vec(),
            is_spectating: session.is_spectating(),
            player_index: state.player_index(),
            pole_lap: session.pole_lap.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceTableRow {
    pub index: usize,
    pub position: Option<u8>,
    pub name: String,
    pub team: String,
    pub race_number: u8,
    pub is_player: bool,
    pub ai_controlled: bool,
    pub telemetry_public: bool,
    pub current_lap: Option<u8>,
    /// 1-based
    pub sector: Option<u8>,
    pub last_lap_ms: Option<u32>,
    pub last_lap: String,
    pub best_lap_ms: Option<u32>,
    pub best_lap: String,
    pub has_fastest_lap: bool,
    pub delta_to_car_in_front_ms: Option<u32>,
    pub delta_to_leader_ms: Option<u32>,
    pub is_pitting: bool,
    pub num_pit_stops: u8,
    pub penalties_sec: u8,
    pub total_warnings: u8,
    pub corner_cutting_warnings: u8,
    pub result_status: ResultStatus,
    pub dnf: bool,
    pub dsq: bool,
    pub visual_compound: Option<VisualTyreCompound>,
    pub tyre_age_laps: Option<u8>,
    pub tyre_wear_avg: Option<f32>,
    pub ers_percent: Option<f32>,
    pub drs: bool,
    pub fuel_remaining_laps: Option<f32>,
    pub damage: Option<DamageSummary>,
}

impl RaceTableRow {
    fn build(driver: &DriverData, fastest_holder: Option<usize>) -> Option<Self> {
        let identity = driver.identity.as_ref()?;
        let lap = &driver.lap;
        Some(Self {
            index: driver.index,
            position: lap.position,
            name: identity.name.clone(),
            team: identity.team.clone(),
            race_number: identity.race_number,
            is_player: identity.is_player,
            ai_controlled: identity.ai_controlled,
            telemetry_public: identity.telemetry_public,
            current_lap: lap.current_lap,
            sector: lap.sector.map(|s| s + 1),
            last_lap_ms: lap.last_lap_ms,
            last_lap: lap_time_text(lap.last_lap_ms),
            best_lap_ms: lap.best_lap_ms,
            best_lap: lap_time_text(lap.best_lap_ms),
            has_fastest_lap: fastest_holder == Some(driver.index),
            delta_to_car_in_front_ms: lap.delta_to_car_in_front_ms,
            delta_to_leader_ms: lap.delta_to_leader_ms,
            is_pitting: lap.is_pitting,
            num_pit_stops: lap.num_pit_stops,
            penalties_sec: lap.penalties_sec,
            total_warnings: lap.total_warnings,
            corner_cutting_warnings: lap.corner_cutting_warnings,
            result_status: lap.result_status,
            dnf: lap.is_dnf,
            dsq: lap.is_dsq,
            visual_compound: driver.tyre.visual_compound,
            tyre_age_laps: driver.tyre.age_laps,
            tyre_wear_avg: driver.tyre.current_wear.map(|wear| wear.average()),
            ers_percent: ers_percent(driver.car.ers_store_energy),
            drs: driver.car.drs_active,
            fuel_remaining_laps: driver.car.fuel_remaining_laps,
            damage: driver.car.damage.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceTable {
    pub session: SessionFields,
    pub active_cars: usize,
    pub dnf_cars: usize,
    pub race_completed: bool,
    pub fastest_lap_ms: Option<u32>,
    pub fastest_lap_holder: Option<usize>,
    pub fastest_sectors_ms: [Option<u32>; 3],
    pub pit_window_ideal_lap: Option<u8>,
    pub pit_window_latest_lap: Option<u8>,
    /// Sorted by track position; cars without a position come last
    pub rows: Vec<RaceTableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTrialTable {
    pub session: SessionFields,
    pub current_lap_time_ms: Option<u32>,
    pub last_lap_ms: Option<u32>,
    pub player_session_best: Option<TimeTrialDataSet>,
    pub personal_best: Option<TimeTrialDataSet>,
    pub rival: Option<TimeTrialDataSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RaceTableDocument {
    Race(RaceTable),
    TimeTrial(TimeTrialTable),
}

impl RaceTableDocument {
    /// Build the table, or `None` before the first session packet.
    pub fn build(state: &SessionState) -> Option<Self> {
        if !state.session.is_valid() {
            return None;
        }
        let session = SessionFields::build(state);

        if state.session.is_time_trial() {
            let time_trial = state.session.time_trial.as_ref();
            let player = state.player();
            return Some(Self::TimeTrial(TimeTrialTable {
                session,
                current_lap_time_ms: player.and_then(|p| p.lap.current_lap_time_ms),
                last_lap_ms: player.and_then(|p| p.lap.last_lap_ms),
                player_session_best: time_trial.map(|tt| tt.player_session_best.clone()),
                personal_best: time_trial.map(|tt| tt.personal_best.clone()),
                rival: time_trial.map(|tt| tt.rival.clone()),
            }));
        }

        let holder = state.fastest_lap_holder();
        let mut rows: Vec<_> =
            state.drivers().filter_map(|driver| RaceTableRow::build(driver, holder)).collect();
        rows.sort_by_key(|row| (row.position.is_none(), row.position, row.index));

        let pit_window = state.session.pit_window();
        Some(Self::Race(RaceTable {
            session,
            active_cars: state.active_cars(),
            dnf_cars: state.dnf_cars(),
            race_completed: state.race_completed(),
            fastest_lap_ms: state.fastest_lap_ms(),
            fastest_lap_holder: holder,
            fastest_sectors_ms: state.fastest_sectors(),
            pit_window_ideal_lap: pit_window.map(|(ideal, _)| ideal).filter(|lap| *lap > 0),
            pit_window_latest_lap: pit_window.map(|(_, latest)| latest).filter(|lap| *lap > 0),
            rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PitTimeLossTables;
    use crate::test_utils::{lap_data, lap_row, participants, session};
    use std::sync::Arc;

    const UID: u64 = 42;

    #[test]
    fn no_table_before_session() {
        let state = SessionState::new(Arc::new(PitTimeLossTables::default()), true);
        assert!(RaceTableDocument::build(&state).is_none());
    }

    #[test]
    fn rows_sorted_by_position() {
        let mut state = SessionState::new(Arc::new(PitTimeLossTables::default()), true);
        state.process_session_update(&session(UID, SessionType::Race, 3600));
        state.process_participants(&participants(UID, &["A", "B", "C"]));
        state.process_lap_data(&lap_data(UID, vec![lap_row(3, 2), lap_row(1, 2), lap_row(2, 2)]));

        let Some(RaceTableDocument::Race(table)) = RaceTableDocument::build(&state) else {
            panic!("expected a race table");
        };
        let names: Vec<_> = table.rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(table.session.track, "Silverstone");
        assert_eq!(table.session.current_lap, Some(2));
        assert_eq!(table.active_cars, 3);
        assert!(table.rows[2].is_player);

        let json = serde_json::to_value(RaceTableDocument::Race(table)).expect("serializable");
        assert_eq!(json["kind"], "race");
    }

    #[test]
    fn time_trial_session_builds_time_trial_view() {
        let mut state = SessionState::new(Arc::new(PitTimeLossTables::default()), true);
        state.process_session_update(&session(UID, SessionType::TimeTrial, 3600));
        let document = RaceTableDocument::build(&state).expect("session is valid");
        assert!(matches!(document, RaceTableDocument::TimeTrial(TimeTrialTable { rival: None, .. })));
        let json = serde_json::to_value(&document).expect("serializable");
        assert_eq!(json["kind"], "time-trial");
    }
}
