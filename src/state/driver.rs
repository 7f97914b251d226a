//! Per-car driver record
//!
//! One [`DriverData`] lives in each car slot. Fields are grouped by concern
//! and mutated in place by the store's update methods; everything that has not
//! arrived yet is `None`.

use serde::Serialize;
use std::collections::BTreeMap;

use super::records::CollisionRecord;
use crate::types::{
    ActualTyreCompound, CarDamageData, CarMotionData, CarSetupData, CarStatusData,
    CarTelemetryData, DriverStatus, FinalClassificationData, LapData, LapHistoryData,
    PacketSessionHistory, ParticipantData, PitStatus, ResultStatus, TelemetrySetting,
    TyreSetData, TyreStintHistoryData, VisualTyreCompound,
};

/// Who is driving the car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverIdentity {
    pub name: String,
    pub team: String,
    pub race_number: u8,
    pub nationality: u8,
    pub network_id: u8,
    pub ai_controlled: bool,
    pub telemetry_public: bool,
    pub is_player: bool,
}

impl DriverIdentity {
    pub fn from_participant(participant: &ParticipantData, is_player: bool) -> Self {
        Self {
            name: participant.name.clone(),
            team: participant.team.clone(),
            race_number: participant.race_number,
            nationality: participant.nationality,
            network_id: participant.network_id,
            ai_controlled: participant.ai_controlled,
            telemetry_public: participant.your_telemetry == TelemetrySetting::Public,
            is_player,
        }
    }
}

/// Position, timing and race status.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LapInfo {
    pub position: Option<u8>,
    pub grid_position: Option<u8>,
    pub current_lap: Option<u8>,
    /// Zero-based
    pub sector: Option<u8>,
    pub current_lap_time_ms: Option<u32>,
    pub last_lap_ms: Option<u32>,
    pub best_lap_ms: Option<u32>,
    /// 1-based lap on which the best lap was set
    pub best_lap_num: Option<u8>,
    /// Sector times of the best lap
    pub best_lap_sectors: [Option<u32>; 3],
    /// Best individual sector times, possibly from different laps
    pub personal_best_sectors: [Option<u32>; 3],
    pub delta_to_car_in_front_ms: Option<u32>,
    pub delta_to_leader_ms: Option<u32>,
    pub lap_distance: Option<f32>,
    pub pit_status: PitStatus,
    pub is_pitting: bool,
    pub num_pit_stops: u8,
    pub penalties_sec: u8,
    pub total_warnings: u8,
    pub corner_cutting_warnings: u8,
    pub driver_status: DriverStatus,
    pub result_status: ResultStatus,
    pub is_dnf: bool,
    pub is_dsq: bool,
    pub speed_trap_kmph: Option<f32>,
}

/// Damage levels in percent plus fault flags.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DamageSummary {
    pub front_left_wing: u8,
    pub front_right_wing: u8,
    pub rear_wing: u8,
    pub floor: u8,
    pub diffuser: u8,
    pub sidepod: u8,
    pub gearbox: u8,
    pub engine: u8,
    pub drs_fault: bool,
    pub ers_fault: bool,
    pub engine_blown: bool,
    pub engine_seized: bool,
}

impl From<&CarDamageData> for DamageSummary {
    fn from(data: &CarDamageData) -> Self {
        Self {
            front_left_wing: data.front_left_wing_damage,
            front_right_wing: data.front_right_wing_damage,
            rear_wing: data.rear_wing_damage,
            floor: data.floor_damage,
            diffuser: data.diffuser_damage,
            sidepod: data.sidepod_damage,
            gearbox: data.gear_box_damage,
            engine: data.engine_damage,
            drs_fault: data.drs_fault,
            ers_fault: data.ers_fault,
            engine_blown: data.engine_blown,
            engine_seized: data.engine_seized,
        }
    }
}

impl DamageSummary {
    /// Components whose damage increased (or faults that appeared) since `previous`.
    pub fn increases(&self, previous: &DamageSummary) -> Vec<String> {
        let levels = [
            ("front left wing", previous.front_left_wing, self.front_left_wing),
            ("front right wing", previous.front_right_wing, self.front_right_wing),
            ("rear wing", previous.rear_wing, self.rear_wing),
            ("floor", previous.floor, self.floor),
            ("diffuser", previous.diffuser, self.diffuser),
            ("sidepod", previous.sidepod, self.sidepod),
            ("gearbox", previous.gearbox, self.gearbox),
            ("engine", previous.engine, self.engine),
        ];
        let faults = [
            ("DRS fault", previous.drs_fault, self.drs_fault),
            ("ERS fault", previous.ers_fault, self.ers_fault),
            ("engine blown", previous.engine_blown, self.engine_blown),
            ("engine seized", previous.engine_seized, self.engine_seized),
        ];

        levels
            .into_iter()
            .filter(|(_, before, after)| after > before)
            .map(|(part, before, after)| format!("{} damage {}% -> {}%", part, before, after))
            .chain(
                faults
                    .into_iter()
                    .filter(|(_, before, after)| *after && !*before)
                    .map(|(fault, _, _)| fault.to_string()),
            )
            .collect()
    }
}

/// Mechanical state of the car.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CarInfo {
    pub drs_allowed: bool,
    pub drs_active: bool,
    /// Joules
    pub ers_store_energy: Option<f32>,
    pub ers_deploy_mode: Option<u8>,
    pub fuel_in_tank: Option<f32>,
    pub fuel_remaining_laps: Option<f32>,
    pub fia_flag: i8,
    pub speed_kmph: Option<u16>,
    pub damage: Option<DamageSummary>,
}

/// Per-corner tyre wear in percent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct TyreWear {
    pub front_left: f32,
    pub front_right: f32,
    pub rear_left: f32,
    pub rear_right: f32,
}

impl TyreWear {
    /// From the game's RL, RR, FL, FR ordering.
    pub fn from_corners(wear: [f32; 4]) -> Self {
        let [rear_left, rear_right, front_left, front_right] = wear;
        Self { front_left, front_right, rear_left, rear_right }
    }

    pub fn average(&self) -> f32 {
        (self.front_left + self.front_right + self.rear_left + self.rear_right) / 4.0
    }
}

/// Tyre wear recorded at the end of a lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TyreWearEntry {
    pub lap: u8,
    pub wear: TyreWear,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TyreInfo {
    pub actual_compound: Option<ActualTyreCompound>,
    pub visual_compound: Option<VisualTyreCompound>,
    pub age_laps: Option<u8>,
    pub current_wear: Option<TyreWear>,
    pub wear_history: Vec<TyreWearEntry>,
    pub stint_history: Vec<TyreStintHistoryData>,
    pub tyre_sets: Vec<TyreSetData>,
    pub fitted_set_index: Option<u8>,
}

/// Copies of the most recent raw per-car records.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PacketCopies {
    pub participant: Option<ParticipantData>,
    pub lap_data: Option<LapData>,
    pub telemetry: Option<CarTelemetryData>,
    pub status: Option<CarStatusData>,
    pub damage: Option<CarDamageData>,
    pub motion: Option<CarMotionData>,
    pub setup: Option<CarSetupData>,
    pub session_history: Option<PacketSessionHistory>,
    pub final_classification: Option<FinalClassificationData>,
}

/// Lap transition awaiting the next car-damage packet, which carries the
/// tyre wear needed to close it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEvent {
    LapChange { completed_lap: u8 },
    Flashback { to_lap: u8 },
}

/// Result of comparing the stored current lap against an incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapChange {
    /// Lap the snapshot is recorded against: `min(previous, new)`
    pub snapshot_lap: u8,
    pub is_flashback: bool,
}

/// Detect a lap transition. A decrease in offline play is a flashback.
pub fn detect_lap_change(previous: Option<u8>, new: u8, offline: bool) -> Option<LapChange> {
    let previous = previous?;
    if previous == new {
        return None;
    }
    Some(LapChange { snapshot_lap: previous.min(new), is_flashback: offline && new < previous })
}

/// State of a car captured when a lap closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapSnapshot {
    pub lap: u8,
    pub position: Option<u8>,
    pub lap_time_ms: Option<u32>,
    pub visual_compound: Option<VisualTyreCompound>,
    pub tyre_age_laps: Option<u8>,
    pub ers_store_energy: Option<f32>,
    pub fuel_in_tank: Option<f32>,
    pub num_pit_stops: u8,
    pub penalties_sec: u8,
}

#[derive(Debug, Clone, Default)]
pub struct DriverData {
    pub index: usize,
    pub identity: Option<DriverIdentity>,
    pub lap: LapInfo,
    pub car: CarInfo,
    pub tyre: TyreInfo,
    pub packets: PacketCopies,
    pub collisions: Vec<CollisionRecord>,
    pub pending: Option<PendingEvent>,
    pub snapshots: BTreeMap<u8, LapSnapshot>,
}

impl DriverData {
    pub fn new(index: usize) -> Self {
        Self { index, ..Default::default() }
    }

    /// Identity data has arrived.
    pub fn is_valid(&self) -> bool {
        self.identity.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.name.as_str())
    }

    pub fn is_player(&self) -> bool {
        self.identity.as_ref().is_some_and(|identity| identity.is_player)
    }

    /// Apply a participating car's lap record. Returns the lap transition, if any.
    pub fn apply_lap_data(&mut self, data: &LapData, offline: bool) -> Option<LapChange> {
        let change = detect_lap_change(self.lap.current_lap, data.current_lap_num, offline);

        let lap = &mut self.lap;
        lap.position = Some(data.car_position);
        lap.grid_position = Some(data.grid_position);
        lap.current_lap = Some(data.current_lap_num);
        lap.sector = Some(data.sector);
        lap.current_lap_time_ms = Some(data.current_lap_time_ms);
        lap.delta_to_car_in_front_ms = Some(data.delta_to_car_in_front_ms);
        lap.delta_to_leader_ms = Some(data.delta_to_race_leader_ms);
        lap.lap_distance = Some(data.lap_distance);
        lap.pit_status = data.pit_status;
        lap.is_pitting = data.pit_status != PitStatus::None;
        lap.num_pit_stops = data.num_pit_stops;
        lap.penalties_sec = data.penalties;
        lap.total_warnings = data.total_warnings;
        lap.corner_cutting_warnings = data.corner_cutting_warnings;
        lap.driver_status = data.driver_status;
        lap.result_status = data.result_status;
        lap.is_dnf = data.result_status.is_dnf();
        lap.is_dsq = data.result_status.is_dsq();
        if data.speed_trap_fastest_speed > 0.0 {
            lap.speed_trap_kmph = Some(data.speed_trap_fastest_speed);
        }
        if data.last_lap_time_ms > 0 {
            lap.last_lap_ms = Some(data.last_lap_time_ms);
        }

        self.packets.lap_data = Some(data.clone());

        if let Some(change) = change {
            self.apply_lap_change(change);
        }
        change
    }

    /// Record the snapshot for a lap transition and queue the wear update.
    /// A flashback first drops everything recorded after the snapshot lap.
    pub fn apply_lap_change(&mut self, change: LapChange) {
        let lap = change.snapshot_lap;
        if change.is_flashback {
            self.snapshots.split_off(&lap.saturating_add(1));
            self.pending = Some(PendingEvent::Flashback { to_lap: lap });
        } else {
            self.pending = Some(PendingEvent::LapChange { completed_lap: lap });
        }
        let snapshot = self.snapshot(lap);
        self.snapshots.insert(lap, snapshot);
    }

    fn snapshot(&self, lap: u8) -> LapSnapshot {
        LapSnapshot {
            lap,
            position: self.lap.position,
            lap_time_ms: self.lap.last_lap_ms,
            visual_compound: self.tyre.visual_compound,
            tyre_age_laps: self.tyre.age_laps,
            ers_store_energy: self.car.ers_store_energy,
            fuel_in_tank: self.car.fuel_in_tank,
            num_pit_stops: self.lap.num_pit_stops,
            penalties_sec: self.lap.penalties_sec,
        }
    }

    /// Close out the final lap when the race is classified.
    pub fn finalize(&mut self, data: &FinalClassificationData) {
        if data.best_lap_time_ms > 0 {
            self.lap.best_lap_ms = Some(data.best_lap_time_ms);
        }
        if data.num_laps > 0 && !self.snapshots.contains_key(&data.num_laps) {
            self.apply_lap_change(LapChange { snapshot_lap: data.num_laps, is_flashback: false });
        }
        if data.position != 0 {
            self.lap.position = Some(data.position);
        }
        self.lap.result_status = data.result_status;
        self.lap.is_dnf = data.result_status.is_dnf();
        self.lap.is_dsq = data.result_status.is_dsq();
        self.packets.final_classification = Some(data.clone());
    }

    /// Apply a car-damage record; returns the damage increases worth reporting.
    pub fn apply_damage(&mut self, data: &CarDamageData) -> Vec<String> {
        let summary = DamageSummary::from(data);
        let increases = match &self.car.damage {
            Some(previous) => summary.increases(previous),
            None => Vec::new(),
        };
        self.car.damage = Some(summary);

        let wear = TyreWear::from_corners(data.tyres_wear);
        self.tyre.current_wear = Some(wear);
        match self.pending.take() {
            Some(PendingEvent::LapChange { completed_lap }) => {
                self.tyre.wear_history.retain(|entry| entry.lap != completed_lap);
                self.tyre.wear_history.push(TyreWearEntry { lap: completed_lap, wear });
            }
            Some(PendingEvent::Flashback { to_lap }) => {
                self.tyre.wear_history.retain(|entry| entry.lap <= to_lap);
            }
            None => {}
        }

        self.packets.damage = Some(data.clone());
        increases
    }

    pub fn apply_telemetry(&mut self, data: &CarTelemetryData) {
        self.car.speed_kmph = Some(data.speed);
        self.car.drs_active = data.drs;
        self.packets.telemetry = Some(data.clone());
    }

    pub fn apply_status(&mut self, data: &CarStatusData) {
        self.car.drs_allowed = data.drs_allowed;
        self.car.ers_store_energy = Some(data.ers_store_energy);
        self.car.ers_deploy_mode = Some(data.ers_deploy_mode);
        self.car.fuel_in_tank = Some(data.fuel_in_tank);
        self.car.fuel_remaining_laps = Some(data.fuel_remaining_laps);
        self.car.fia_flag = data.vehicle_fia_flags;
        self.tyre.actual_compound = Some(data.actual_tyre_compound);
        self.tyre.visual_compound = Some(data.visual_tyre_compound);
        self.tyre.age_laps = Some(data.tyres_age_laps);
        self.packets.status = Some(data.clone());
    }

    /// Apply a session-history record. Returns whether the best lap changed.
    pub fn apply_session_history(&mut self, packet: &PacketSessionHistory) -> bool {
        let recorded = usize::from(packet.num_laps).min(packet.lap_history_data.len());
        let laps = &packet.lap_history_data[..recorded];
        let previous_best = self.lap.best_lap_ms;

        match packet.best_lap_time_lap_num {
            0 => {
                self.lap.best_lap_ms = None;
                self.lap.best_lap_num = None;
                self.lap.best_lap_sectors = [None; 3];
            }
            n => {
                if let Some(entry) = history_entry(laps, n) {
                    self.lap.best_lap_ms = nonzero(entry.lap_time_ms);
                    self.lap.best_lap_num = Some(n);
                    self.lap.best_lap_sectors = [
                        nonzero(entry.sector1_time_ms),
                        nonzero(entry.sector2_time_ms),
                        nonzero(entry.sector3_time_ms),
                    ];
                }
            }
        }

        self.lap.last_lap_ms =
            laps.iter().rev().find(|entry| entry.lap_time_ms > 0).map(|entry| entry.lap_time_ms);

        let sector_laps = [
            packet.best_sector1_lap_num,
            packet.best_sector2_lap_num,
            packet.best_sector3_lap_num,
        ];
        for (sector, lap_num) in sector_laps.into_iter().enumerate() {
            if lap_num == 0 {
                self.lap.personal_best_sectors[sector] = None;
            } else if let Some(entry) = history_entry(laps, lap_num) {
                self.lap.personal_best_sectors[sector] = nonzero(sector_time(entry, sector));
            }
        }

        let stints = usize::from(packet.num_tyre_stints).min(packet.tyre_stints_history_data.len());
        self.tyre.stint_history = packet.tyre_stints_history_data[..stints].to_vec();
        self.packets.session_history = Some(packet.clone());

        previous_best != self.lap.best_lap_ms
    }
}

/// Entry for a 1-based lap number, if that lap was recorded.
fn history_entry(laps: &[LapHistoryData], lap_num: u8) -> Option<&LapHistoryData> {
    usize::from(lap_num).checked_sub(1).and_then(|idx| laps.get(idx))
}

fn sector_time(entry: &LapHistoryData, sector: usize) -> u32 {
    match sector {
        0 => entry.sector1_time_ms,
        1 => entry.sector2_time_ms,
        _ => entry.sector3_time_ms,
    }
}

fn nonzero(ms: u32) -> Option<u32> {
    (ms > 0).then_some(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lap(time: u32, s1: u32, s2: u32, s3: u32) -> LapHistoryData {
        LapHistoryData {
            lap_time_ms: time,
            sector1_time_ms: s1,
            sector2_time_ms: s2,
            sector3_time_ms: s3,
            lap_valid_bit_flags: 0x0F,
        }
    }

    #[test]
    fn flashback_from_five_to_three_offline() {
        let change = detect_lap_change(Some(5), 3, true).expect("lap changed");
        assert!(change.is_flashback);
        assert_eq!(change.snapshot_lap, 3);
    }

    #[test]
    fn decrease_online_is_not_flashback() {
        let change = detect_lap_change(Some(5), 3, false).expect("lap changed");
        assert!(!change.is_flashback);
        assert_eq!(change.snapshot_lap, 3);
        assert_eq!(detect_lap_change(None, 3, true), None);
        assert_eq!(detect_lap_change(Some(3), 3, true), None);
    }

    proptest! {
        #[test]
        fn prop_snapshot_lap_is_minimum(previous in any::<u8>(), new in any::<u8>(), offline in any::<bool>()) {
            match detect_lap_change(Some(previous), new, offline) {
                None => prop_assert_eq!(previous, new),
                Some(change) => {
                    prop_assert_eq!(change.snapshot_lap, previous.min(new));
                    prop_assert_eq!(change.is_flashback, offline && new < previous);
                }
            }
        }
    }

    #[test]
    fn flashback_drops_later_snapshots_and_wear() {
        let mut driver = DriverData::new(0);
        for lap_num in 1..=5u8 {
            driver.apply_lap_data(&LapData { current_lap_num: lap_num, ..Default::default() }, true);
            let wear = [f32::from(lap_num); 4];
            driver.apply_damage(&CarDamageData { tyres_wear: wear, ..Default::default() });
        }
        assert_eq!(driver.snapshots.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(driver.tyre.wear_history.len(), 4);

        driver.apply_lap_data(&LapData { current_lap_num: 3, ..Default::default() }, true);
        assert_eq!(driver.pending, Some(PendingEvent::Flashback { to_lap: 3 }));
        driver.apply_damage(&CarDamageData::default());

        assert_eq!(driver.snapshots.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        let wear_laps: Vec<_> = driver.tyre.wear_history.iter().map(|e| e.lap).collect();
        assert_eq!(wear_laps, vec![1, 2, 3]);
        assert_eq!(driver.pending, None);
    }

    #[test]
    fn session_history_best_and_last_lap() {
        let mut driver = DriverData::new(3);
        let packet = PacketSessionHistory {
            num_laps: 3,
            best_lap_time_lap_num: 2,
            best_sector1_lap_num: 1,
            best_sector2_lap_num: 2,
            best_sector3_lap_num: 2,
            lap_history_data: vec![
                lap(91_000, 30_000, 31_000, 30_000),
                lap(90_000, 30_500, 29_500, 30_000),
                lap(0, 29_000, 0, 0),
            ],
            ..Default::default()
        };
        assert!(driver.apply_session_history(&packet));
        assert_eq!(driver.lap.best_lap_ms, Some(90_000));
        assert_eq!(driver.lap.best_lap_num, Some(2));
        assert_eq!(driver.lap.last_lap_ms, Some(90_000));
        assert_eq!(driver.lap.personal_best_sectors, [Some(30_000), Some(29_500), Some(30_000)]);

        // Same data again is not a change
        assert!(!driver.apply_session_history(&packet));
    }

    #[test]
    fn session_history_out_of_range_keeps_cache_and_zero_clears() {
        let mut driver = DriverData::new(0);
        driver.lap.best_lap_ms = Some(88_000);
        let out_of_range = PacketSessionHistory {
            num_laps: 1,
            best_lap_time_lap_num: 4,
            lap_history_data: vec![lap(92_000, 0, 0, 0)],
            ..Default::default()
        };
        assert!(!driver.apply_session_history(&out_of_range));
        assert_eq!(driver.lap.best_lap_ms, Some(88_000));

        let restarted = PacketSessionHistory::default();
        assert!(driver.apply_session_history(&restarted));
        assert_eq!(driver.lap.best_lap_ms, None);
        assert_eq!(driver.lap.last_lap_ms, None);
    }

    #[test]
    fn damage_increases_are_reported_once() {
        let mut driver = DriverData::new(1);
        assert!(driver.apply_damage(&CarDamageData::default()).is_empty());
        let hit = CarDamageData { front_left_wing_damage: 35, drs_fault: true, ..Default::default() };
        let increases = driver.apply_damage(&hit);
        assert_eq!(increases, vec!["front left wing damage 0% -> 35%", "DRS fault"]);
        assert!(driver.apply_damage(&hit).is_empty());
    }

    #[test]
    fn wear_corner_order() {
        let wear = TyreWear::from_corners([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(wear.rear_left, 1.0);
        assert_eq!(wear.front_right, 4.0);
        assert_eq!(wear.average(), 2.5);
    }
}
