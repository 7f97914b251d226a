//! On-demand per-driver document

use serde::Serialize;

use crate::state::{
    CarInfo, CollisionRecord, DriverIdentity, LapInfo, LapSnapshot, OvertakeRecord,
    OvertakeStatus, RaceControlMessage, SessionState, TyreWear, TyreWearEntry,
};
use crate::types::TyreStintHistoryData;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInfoView {
    pub index: usize,
    pub identity: DriverIdentity,
    pub lap: LapInfo,
    pub car: CarInfo,
    pub has_fastest_lap: bool,
    pub tyre_wear: Option<TyreWear>,
    pub tyre_wear_history: Vec<TyreWearEntry>,
    pub tyre_stint_history: Vec<TyreStintHistoryData>,
    pub lap_snapshots: Vec<LapSnapshot>,
    pub collisions: Vec<CollisionRecord>,
    pub overtake_status: OvertakeStatus,
    pub overtakes: Vec<OvertakeRecord>,
    pub race_control: Vec<RaceControlMessage>,
}

impl DriverInfoView {
    /// Everything known about the driver in slot `index`; `None` for an
    /// empty or not yet identified slot.
    pub fn build(state: &SessionState, index: usize) -> Option<Self> {
        let driver = state.driver(index)?;
        let identity = driver.identity.clone()?;
        let overtakes = state.overtakes();

        Some(Self {
            index,
            overtake_status: overtakes.status(&identity.name),
            overtakes: overtakes.involving(&identity.name).cloned().collect(),
            identity,
            lap: driver.lap.clone(),
            car: driver.car.clone(),
            has_fastest_lap: state.fastest_lap_holder() == Some(index),
            tyre_wear: driver.tyre.current_wear,
            tyre_wear_history: driver.tyre.wear_history.clone(),
            tyre_stint_history: driver.tyre.stint_history.clone(),
            lap_snapshots: driver.snapshots.values().cloned().collect(),
            collisions: driver.collisions.clone(),
            race_control: state.race_control().for_driver(index).into_iter().cloned().collect(),
        })
    }
}
