//! Authoritative session state
//!
//! [`SessionState`] holds the global [`SessionInfo`], a fixed array of
//! [`DriverData`] slots indexed by car index, and the session-scoped derived
//! aggregates. It exposes one synchronous update method per packet type; none
//! of them suspend, return errors, or panic on missing data.
//!
//! The store has exactly one writer: the engine task that owns the router.
//! Readers observe it between packets through command replies, so every read
//! sees the state as of the last fully applied packet.

pub mod driver;
pub mod fastest;
pub mod race_control;
pub mod records;
pub mod session_info;
pub mod tyre_delta;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::PitTimeLossTables;
use crate::types::{
    MAX_CARS, PacketCarDamage, PacketCarSetups, PacketCarStatus, PacketCarTelemetry,
    PacketEvent, PacketFinalClassification, PacketHeader, PacketLapData, PacketMotion,
    PacketParticipants, PacketSession, PacketSessionHistory, PacketTimeTrial, PacketTyreSets,
};

pub use driver::{
    CarInfo, DamageSummary, DriverData, DriverIdentity, LapChange, LapInfo, LapSnapshot,
    PendingEvent, TyreInfo, TyreWear, TyreWearEntry, detect_lap_change,
};
pub use fastest::FastestLapTracker;
pub use race_control::{MessageKind, RaceControlManager, RaceControlMessage};
pub use records::{
    CollisionRecord, CustomMarkerEntry, CustomMarkersHistory, EventParty, OvertakeRecord,
    OvertakeStatus, OvertakeSummary, OvertakesHistory,
};
pub use session_info::{PoleLap, SessionInfo};
pub use tyre_delta::TyreDeltaMessage;

/// Outcome of comparing an incoming session packet against the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    /// The game is between sessions
    ZeroDuration,
    NewSession { previous: u64, current: u64 },
}

impl SessionChange {
    pub fn requires_clear(self) -> bool {
        !matches!(self, SessionChange::Unchanged)
    }
}

pub struct SessionState {
    pub session: SessionInfo,
    drivers: [Option<DriverData>; MAX_CARS],
    player_index: Option<usize>,
    fastest_lap: FastestLapTracker,
    fastest_sectors: [Option<u32>; 3],
    active_cars: usize,
    dnf_cars: usize,
    race_completed: bool,
    player_dnf: bool,
    collisions: Vec<CollisionRecord>,
    overtakes: OvertakesHistory,
    custom_markers: CustomMarkersHistory,
    race_control: RaceControlManager,
    packet_count: u64,
    first_session_update_seen: bool,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("session_uid", &self.session.session_uid)
            .field("drivers", &self.drivers().count())
            .field("packet_count", &self.packet_count)
            .field("race_completed", &self.race_completed)
            .finish()
    }
}

impl SessionState {
    pub fn new(pit_time_loss: Arc<PitTimeLossTables>, retain_race_control: bool) -> Self {
        Self {
            session: SessionInfo::new(pit_time_loss),
            drivers: std::array::from_fn(|_| None),
            player_index: None,
            fastest_lap: FastestLapTracker::default(),
            fastest_sectors: [None; 3],
            active_cars: 0,
            dnf_cars: 0,
            race_completed: false,
            player_dnf: false,
            collisions: Vec::new(),
            overtakes: OvertakesHistory::default(),
            custom_markers: CustomMarkersHistory::default(),
            race_control: RaceControlManager::new(retain_race_control),
            packet_count: 0,
            first_session_update_seen: false,
        }
    }

    /// Reset everything session-scoped. The pit-time-loss tables and the
    /// race-control retention policy survive.
    pub fn clear(&mut self) {
        self.session.clear();
        self.drivers = std::array::from_fn(|_| None);
        self.player_index = None;
        self.fastest_lap.clear();
        self.fastest_sectors = [None; 3];
        self.active_cars = 0;
        self.dnf_cars = 0;
        self.race_completed = false;
        self.player_dnf = false;
        self.collisions.clear();
        self.overtakes.clear();
        self.custom_markers.clear();
        self.race_control.clear();
        self.packet_count = 0;
        self.first_session_update_seen = false;
    }

    // Slots

    fn slot_mut(&mut self, index: usize) -> Option<&mut DriverData> {
        self.drivers.get_mut(index).map(|slot| slot.get_or_insert_with(|| DriverData::new(index)))
    }

    /// Slot for `index`, whether or not identity data has arrived.
    pub fn driver(&self, index: usize) -> Option<&DriverData> {
        self.drivers.get(index).and_then(Option::as_ref)
    }

    /// Valid drivers in car-index order.
    pub fn drivers(&self) -> impl Iterator<Item = &DriverData> {
        self.drivers.iter().flatten().filter(|driver| driver.is_valid())
    }

    /// Number of slots that have been created, valid or not.
    pub fn occupied_slots(&self) -> usize {
        self.drivers.iter().flatten().count()
    }

    pub fn player_index(&self) -> Option<usize> {
        self.player_index
    }

    pub fn player(&self) -> Option<&DriverData> {
        self.player_index.and_then(|idx| self.driver(idx))
    }

    /// The car shown on the overlay: the spectated car when spectating,
    /// otherwise the player.
    pub fn focus_index(&self) -> Option<usize> {
        self.session.spectator_car_index().map(usize::from).or(self.player_index)
    }

    fn display_name(&self, index: usize) -> String {
        self.driver(index)
            .and_then(DriverData::name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Car {}", index))
    }

    fn note_player(&mut self, header: &PacketHeader) {
        let idx = usize::from(header.player_car_index);
        self.player_index = (idx < MAX_CARS).then_some(idx);
    }

    /// Best lap of every valid slot, indexed by car index.
    pub fn best_laps(&self) -> [Option<u32>; MAX_CARS] {
        std::array::from_fn(|idx| {
            self.driver(idx).filter(|d| d.is_valid()).and_then(|d| d.lap.best_lap_ms)
        })
    }

    // Aggregates

    pub fn fastest_lap_holder(&self) -> Option<usize> {
        self.fastest_lap.holder()
    }

    pub fn fastest_lap_ms(&self) -> Option<u32> {
        self.fastest_lap_holder().and_then(|idx| self.driver(idx)).and_then(|d| d.lap.best_lap_ms)
    }

    pub fn fastest_sectors(&self) -> [Option<u32>; 3] {
        self.fastest_sectors
    }

    pub fn active_cars(&self) -> usize {
        self.active_cars
    }

    pub fn dnf_cars(&self) -> usize {
        self.dnf_cars
    }

    pub fn race_completed(&self) -> bool {
        self.race_completed
    }

    pub fn player_dnf(&self) -> bool {
        self.player_dnf
    }

    pub fn collisions(&self) -> &[CollisionRecord] {
        &self.collisions
    }

    pub fn overtakes(&self) -> &OvertakesHistory {
        &self.overtakes
    }

    pub fn custom_markers(&self) -> &CustomMarkersHistory {
        &self.custom_markers
    }

    pub fn race_control(&self) -> &RaceControlManager {
        &self.race_control
    }

    pub fn count_packet(&mut self) {
        self.packet_count += 1;
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    // Session

    /// Whether `packet` starts a new session (or signals the menus).
    pub fn check_session_change(&self, packet: &PacketSession) -> SessionChange {
        if packet.session_duration == 0 {
            return SessionChange::ZeroDuration;
        }
        match self.session.session_uid {
            Some(previous) if previous != packet.header.session_uid => {
                SessionChange::NewSession { previous, current: packet.header.session_uid }
            }
            _ => SessionChange::Unchanged,
        }
    }

    /// Apply a session packet. Returns true for the first applied packet of a
    /// real (non-zero duration) session.
    pub fn process_session_update(&mut self, packet: &PacketSession) -> bool {
        self.session.apply(packet);
        self.note_player(&packet.header);
        if packet.session_duration == 0 || self.first_session_update_seen {
            return false;
        }
        self.first_session_update_seen = true;
        info!(
            session_uid = packet.header.session_uid,
            track = packet.track_id.name(),
            session_type = packet.session_type.label(),
            formula = packet.formula.label(),
            packet_format = packet.header.packet_format,
            "Session started"
        );
        true
    }

    // Per-car packets

    pub fn process_lap_data(&mut self, packet: &PacketLapData) {
        self.note_player(&packet.header);
        let offline = self.session.is_offline();
        let holder = self.fastest_lap.holder();
        let player = self.player_index;

        let mut active = 0;
        let mut dnf = 0;
        let mut player_dnf = self.player_dnf;
        let mut rescan = holder.is_none();

        for (idx, data) in packet.car_lap_data.iter().enumerate().take(MAX_CARS) {
            let Some(driver) = self.slot_mut(idx) else { continue };
            if !data.result_status.is_participating() {
                driver.lap.result_status = data.result_status;
                continue;
            }
            active += 1;
            let change = driver.apply_lap_data(data, offline);
            if driver.lap.is_dnf {
                dnf += 1;
            }
            if change.is_some() && holder == Some(idx) {
                rescan = true;
            }
            if player == Some(idx) {
                player_dnf = driver.lap.is_dnf;
            }
            if let Some(change) = change.filter(|c| c.is_flashback) {
                debug!(car = idx, lap = change.snapshot_lap, "Flashback detected");
            }
        }

        self.active_cars = active;
        self.dnf_cars = dnf;
        self.player_dnf = player_dnf;
        if rescan {
            self.fastest_lap.flag_rescan();
        }
    }

    pub fn process_participants(&mut self, packet: &PacketParticipants) {
        self.note_player(&packet.header);
        let player = self.player_index;
        let count = usize::from(packet.num_active_cars).min(MAX_CARS);
        let mut takeovers = Vec::new();

        for (idx, participant) in packet.participants.iter().enumerate().take(count) {
            let Some(driver) = self.slot_mut(idx) else { continue };
            let previous_ai = driver.identity.as_ref().map(|identity| identity.ai_controlled);
            driver.identity = Some(DriverIdentity::from_participant(participant, player == Some(idx)));
            driver.packets.participant = Some(participant.clone());
            if previous_ai.is_some_and(|previous| previous != participant.ai_controlled) {
                takeovers.push((idx, participant.ai_controlled, driver.lap.current_lap));
            }
        }

        for (idx, ai_controlled, lap) in takeovers {
            let controller = if ai_controlled { "AI" } else { "human" };
            let text = format!("{} is now {} controlled", self.display_name(idx), controller);
            self.race_control.push(
                packet.header.session_time,
                MessageKind::AiControl,
                vec![idx],
                lap,
                text,
            );
        }
    }

    pub fn process_car_telemetry(&mut self, packet: &PacketCarTelemetry) {
        for (idx, data) in packet.car_telemetry_data.iter().enumerate().take(MAX_CARS) {
            if let Some(driver) = self.slot_mut(idx) {
                driver.apply_telemetry(data);
            }
        }
    }

    pub fn process_car_status(&mut self, packet: &PacketCarStatus) {
        for (idx, data) in packet.car_status_data.iter().enumerate().take(MAX_CARS) {
            if let Some(driver) = self.slot_mut(idx) {
                driver.apply_status(data);
            }
        }
    }

    pub fn process_car_damage(&mut self, packet: &PacketCarDamage) {
        let mut reports = Vec::new();
        for (idx, data) in packet.car_damage_data.iter().enumerate().take(MAX_CARS) {
            let Some(driver) = self.slot_mut(idx) else { continue };
            let increases = driver.apply_damage(data);
            if driver.is_valid() && !increases.is_empty() {
                reports.push((idx, driver.lap.current_lap, increases));
            }
        }

        for (idx, lap, increases) in reports {
            let text = format!("{}: {}", self.display_name(idx), increases.join(", "));
            self.race_control.push(
                packet.header.session_time,
                MessageKind::CarDamage,
                vec![idx],
                lap,
                text,
            );
        }
    }

    pub fn process_tyre_sets(&mut self, packet: &PacketTyreSets) {
        if let Some(driver) = self.slot_mut(usize::from(packet.car_idx)) {
            driver.tyre.tyre_sets = packet.tyre_set_data.clone();
            driver.tyre.fitted_set_index = Some(packet.fitted_idx);
        }
    }

    pub fn process_motion(&mut self, packet: &PacketMotion) {
        for (idx, data) in packet.car_motion_data.iter().enumerate().take(MAX_CARS) {
            if let Some(driver) = self.slot_mut(idx) {
                driver.packets.motion = Some(data.clone());
            }
        }
    }

    pub fn process_car_setups(&mut self, packet: &PacketCarSetups) {
        for (idx, data) in packet.car_setups.iter().enumerate().take(MAX_CARS) {
            if let Some(driver) = self.slot_mut(idx) {
                driver.packets.setup = Some(data.clone());
            }
        }
    }

    pub fn process_time_trial(&mut self, packet: &PacketTimeTrial) {
        self.session.time_trial = Some(packet.clone());
    }

    pub fn process_session_history(&mut self, packet: &PacketSessionHistory) {
        let idx = usize::from(packet.car_idx);
        let Some(driver) = self.slot_mut(idx) else {
            debug!(car = idx, "Session history for out-of-range car");
            return;
        };
        driver.apply_session_history(packet);
        self.refresh_fastest_sectors();
        let best_laps = self.best_laps();
        self.fastest_lap.update(idx, &best_laps);
    }

    fn refresh_fastest_sectors(&mut self) {
        let mut fastest = [None; 3];
        for driver in self.drivers() {
            for (sector, best) in fastest.iter_mut().enumerate() {
                *best = fastest::min_time(*best, driver.lap.personal_best_sectors[sector]);
            }
        }
        self.fastest_sectors = fastest;
    }

    /// Close out every classified car and freeze the race.
    pub fn process_final_classification(&mut self, packet: &PacketFinalClassification) {
        let cars = usize::from(packet.num_cars).min(MAX_CARS);
        for (idx, data) in packet.classification_data.iter().enumerate().take(cars) {
            if let Some(driver) = self.slot_mut(idx) {
                driver.finalize(data);
            }
        }
        // Classified best laps can move the holder in either direction
        let best_laps = self.best_laps();
        self.fastest_lap.rescan(&best_laps);
        self.refresh_fastest_sectors();
        self.session.final_classification = Some(packet.clone());
        self.race_completed = true;
        info!(
            session_uid = packet.header.session_uid,
            cars = cars,
            "Final classification received"
        );
    }

    // Events

    /// Fold a fastest-lap event into the car's best lap.
    pub fn process_fastest_lap_event(&mut self, vehicle_idx: u8, lap_time_secs: f32) {
        let idx = usize::from(vehicle_idx);
        let lap_ms = (lap_time_secs * 1000.0).round() as u32;
        let Some(driver) = self.slot_mut(idx) else { return };
        driver.lap.best_lap_ms = fastest::min_time(driver.lap.best_lap_ms, Some(lap_ms));
        let best_laps = self.best_laps();
        self.fastest_lap.update(idx, &best_laps);
    }

    pub fn process_retirement(&mut self, vehicle_idx: u8) {
        let Some(driver) = self.slot_mut(usize::from(vehicle_idx)) else { return };
        driver.lap.is_dnf = true;
        let is_player = driver.is_player();
        if is_player {
            self.player_dnf = true;
        }
    }

    fn party(&self, vehicle_idx: u8) -> Option<EventParty> {
        let driver = self.driver(usize::from(vehicle_idx))?;
        Some(EventParty {
            name: driver.name()?.to_string(),
            lap: driver.lap.current_lap?,
            index: driver.index,
        })
    }

    /// Record a collision. Dropped unless both cars have a name and a lap.
    pub fn process_collision(&mut self, vehicle1_idx: u8, vehicle2_idx: u8) -> bool {
        let (Some(driver_1), Some(driver_2)) = (self.party(vehicle1_idx), self.party(vehicle2_idx))
        else {
            debug!(vehicle1_idx, vehicle2_idx, "Dropping collision with unknown party");
            return false;
        };
        let record = CollisionRecord { driver_1, driver_2 };
        for idx in [vehicle1_idx, vehicle2_idx] {
            if let Some(driver) = self.slot_mut(usize::from(idx)) {
                driver.collisions.push(record.clone());
            }
        }
        self.collisions.push(record);
        true
    }

    /// Record an overtake. Dropped unless both cars have a name and a lap.
    pub fn process_overtake(&mut self, overtaking_idx: u8, overtaken_idx: u8) -> bool {
        let (Some(overtaking), Some(overtaken)) = (self.party(overtaking_idx), self.party(overtaken_idx))
        else {
            debug!(overtaking_idx, overtaken_idx, "Dropping overtake with unknown party");
            return false;
        };
        self.overtakes.push(OvertakeRecord { overtaking, overtaken });
        true
    }

    /// The game rewound; lap history will be rewritten by the next lap data,
    /// so the fastest-lap holder is recomputed from scratch.
    pub fn process_flashback_event(&mut self, frame_identifier: u32, session_time: f32) {
        info!(frame_identifier, session_time, "Flashback");
        self.fastest_lap.flag_rescan();
    }

    /// Log a game event as a race-control message.
    pub fn record_game_event(&mut self, event: &PacketEvent) {
        let (kind, involved, text) =
            race_control::describe_event(&event.details, |idx| self.display_name(usize::from(idx)));
        let lap =
            involved.first().and_then(|idx| self.driver(*idx)).and_then(|d| d.lap.current_lap);
        self.race_control.push(event.header.session_time, kind, involved, lap, text);
    }

    // User actions

    /// Bookmark the player's current position. `None` unless track, session
    /// type, track length and the player's lap data are all known.
    pub fn insert_custom_marker(&mut self) -> Option<CustomMarkerEntry> {
        let track = self.session.track()?;
        let session_type = self.session.session_type()?;
        let track_length = self.session.track_length().filter(|length| *length > 0)?;
        let data = self.player()?.packets.lap_data.as_ref()?;

        let percent = data.lap_distance.max(0.0) / f32::from(track_length) * 100.0;
        let entry = CustomMarkerEntry {
            track: track.name().to_string(),
            event_type: session_type.label().to_string(),
            lap: data.current_lap_num,
            sector: data.sector.saturating_add(1),
            curr_lap_time: crate::format::lap_time(data.current_lap_time_ms),
            curr_lap_percent: format!("{:.2}%", percent),
        };
        self.custom_markers.push(entry.clone());
        Some(entry)
    }

    /// Tyre-delta advisory for the player. Empty when spectating, after the
    /// player's DNF, in time trial, or before any tyre-set data.
    pub fn tyre_delta_messages(&self) -> Vec<TyreDeltaMessage> {
        if self.session.is_spectating() || self.player_dnf || self.session.is_time_trial() {
            return Vec::new();
        }
        let Some(player) = self.player() else { return Vec::new() };
        let sets = &player.tyre.tyre_sets;
        if sets.is_empty() {
            return Vec::new();
        }
        let fitted = player
            .tyre
            .fitted_set_index
            .and_then(|idx| sets.get(usize::from(idx)))
            .map(|set| set.actual_tyre_compound)
            .or(player.tyre.actual_compound)
            .unwrap_or_default();
        tyre_delta::compute(fitted, sets)
    }

    /// Store a pole-lap lookup result. Ignored when the session changed while
    /// the lookup was in flight.
    pub fn set_pole_lap(&mut self, session_uid: u64, pole_lap: Option<PoleLap>) -> bool {
        if self.session.session_uid != Some(session_uid) {
            debug!(session_uid, "Discarding pole lap for a stale session");
            return false;
        }
        self.session.pole_lap = pole_lap;
        true
    }
}
