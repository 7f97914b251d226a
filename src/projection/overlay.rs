//! Player-only stream overlay document

use serde::Serialize;

use super::{ers_percent, lap_time_text};
use crate::state::{SessionState, TyreWear};
use crate::types::VisualTyreCompound;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamOverlay {
    pub track: String,
    pub session_type: String,
    pub name: String,
    pub position: Option<u8>,
    pub total_cars: usize,
    pub current_lap: Option<u8>,
    pub total_laps: Option<u8>,
    /// 1-based
    pub sector: Option<u8>,
    pub current_lap_time: String,
    pub last_lap: String,
    pub best_lap: String,
    pub session_best_lap: String,
    pub delta_to_car_in_front_ms: Option<u32>,
    pub delta_to_leader_ms: Option<u32>,
    pub speed_kmph: Option<u16>,
    pub drs: bool,
    pub visual_compound: Option<VisualTyreCompound>,
    pub tyre_age_laps: Option<u8>,
    pub tyre_wear: Option<TyreWear>,
    pub ers_percent: Option<f32>,
    pub ers_deploy_mode: Option<u8>,
    pub fuel_remaining_laps: Option<f32>,
    pub penalties_sec: u8,
    pub pit_window_ideal_lap: Option<u8>,
    pub pole_lap: Option<String>,
}

impl StreamOverlay {
    /// Build the overlay for the focused car (the spectated car when
    /// spectating). `None` until that car is known.
    pub fn build(state: &SessionState) -> Option<Self> {
        let driver = state.focus_index().and_then(|idx| state.driver(idx))?;
        let identity = driver.identity.as_ref()?;
        let session = &state.session;
        let lap = &driver.lap;

        Some(Self {
            track: session.track().map(|t| t.name().to_string()).unwrap_or_default(),
            session_type: session.session_type().map(|t| t.label().to_string()).unwrap_or_default(),
            name: identity.name.clone(),
            position: lap.position,
            total_cars: state.active_cars(),
            current_lap: lap.current_lap,
            total_laps: session.total_laps(),
            sector: lap.sector.map(|s| s + 1),
            current_lap_time: lap_time_text(lap.current_lap_time_ms),
            last_lap: lap_time_text(lap.last_lap_ms),
            best_lap: lap_time_text(lap.best_lap_ms),
            session_best_lap: lap_time_text(state.fastest_lap_ms()),
            delta_to_car_in_front_ms: lap.delta_to_car_in_front_ms,
            delta_to_leader_ms: lap.delta_to_leader_ms,
            speed_kmph: driver.car.speed_kmph,
            drs: driver.car.drs_active,
            visual_compound: driver.tyre.visual_compound,
            tyre_age_laps: driver.tyre.age_laps,
            tyre_wear: driver.tyre.current_wear,
            ers_percent: ers_percent(driver.car.ers_store_energy),
            ers_deploy_mode: driver.car.ers_deploy_mode,
            fuel_remaining_laps: driver.car.fuel_remaining_laps,
            penalties_sec: lap.penalties_sec,
            pit_window_ideal_lap: session.pit_window().map(|(ideal, _)| ideal).filter(|l| *l > 0),
            pole_lap: session.pole_lap.as_ref().map(|pole| {
                format!("{} ({}) {}", pole.driver, pole.team, crate::format::lap_time(pole.lap_time_ms))
            }),
        })
    }
}
