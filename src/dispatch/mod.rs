//! Packet dispatch router
//!
//! [`PacketRouter`] owns the [`SessionState`] and routes every decoded packet
//! to its update method. Routing goes through two fixed tables resolved at
//! construction: one over [`PacketKind`] and one over [`EventKind`]. Both are
//! built from exhaustive matches, so adding a packet or event kind fails to
//! compile until it is routed.
//!
//! The router also owns the once-per-session guards (final classification,
//! start-lights clear), the UDP action button debouncer, and the command-style
//! entry points used by the engine (action-code updates, manual save).

mod debounce;

pub use debounce::{ButtonAction, ButtonDebouncer};

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{AutosaveSettings, Settings, UdpActionCodes};
use crate::messages::{ExternalApiUpdate, FrontendUpdate, HudNotification, Outbox, SaveRequest};
use crate::projection::{DebugInfo, PostRaceDump, dump_file_name};
use crate::state::{PoleLap, SessionChange, SessionState};
use crate::types::{
    ButtonFlags, EventDetails, EventKind, InboundFrame, Packet, PacketEvent,
    PacketFinalClassification, PacketKind, PacketSession, SessionCategory,
};
use crate::watchdog::WatchdogHandle;

type PacketHandler = fn(&mut PacketRouter, &Packet);
type EventHandler = fn(&mut PacketRouter, &PacketEvent);

const FINAL_CLASSIFICATION_REASON: &str = "Final Classification";
const MANUAL_SAVE_REASON: &str = "Manual save";

/// Outcome of a command-style request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CommandResult {
    Success { message: String },
    Failure { message: String },
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        CommandResult::Success { message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        CommandResult::Failure { message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CommandResult::Success { message } | CommandResult::Failure { message } => message,
        }
    }
}

pub struct PacketRouter {
    state: SessionState,
    packet_handlers: [Option<PacketHandler>; PacketKind::ALL.len()],
    event_handlers: [EventHandler; EventKind::ALL.len()],
    action_codes: UdpActionCodes,
    autosave: AutosaveSettings,
    debouncer: ButtonDebouncer,
    outbox: Outbox,
    watchdog: Option<WatchdogHandle>,
    forwarder: Option<mpsc::Sender<Arc<[u8]>>>,
    final_classification_uid: Option<u64>,
    start_lights_clear_uid: Option<u64>,
}

impl std::fmt::Debug for PacketRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketRouter")
            .field("state", &self.state)
            .field("action_codes", &self.action_codes)
            .field("forwarding", &self.forwarder.is_some())
            .finish()
    }
}

impl PacketRouter {
    pub fn new(settings: &Settings, outbox: Outbox) -> Self {
        let process_car_setups = settings.privacy.process_car_setups;
        if !process_car_setups {
            debug!("Car setup packets will not be processed");
        }
        Self {
            state: SessionState::new(
                Arc::new(settings.pit_time_loss.clone()),
                settings.race_control.retain_messages,
            ),
            packet_handlers: PacketKind::ALL.map(|kind| packet_handler(kind, process_car_setups)),
            event_handlers: EventKind::ALL.map(event_handler),
            action_codes: settings.udp_action_codes,
            autosave: settings.autosave.clone(),
            debouncer: ButtonDebouncer::new(settings.timing.button_debounce()),
            outbox,
            watchdog: None,
            forwarder: None,
            final_classification_uid: None,
            start_lights_clear_uid: None,
        }
    }

    pub fn with_watchdog(mut self, watchdog: WatchdogHandle) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// Queue a copy of every raw frame on `forwarder`. A full queue drops the frame.
    pub fn with_forwarder(mut self, forwarder: mpsc::Sender<Arc<[u8]>>) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Route one inbound frame. Never fails and never suspends.
    pub fn dispatch(&mut self, frame: &InboundFrame) {
        if let Some(watchdog) = &self.watchdog {
            watchdog.kick();
        }
        self.state.count_packet();
        self.forward(&frame.raw);

        let kind = frame.packet.kind();
        match self.packet_handlers[kind.index()] {
            Some(handler) => handler(self, &frame.packet),
            None => trace!(?kind, "No handler registered, ignoring packet"),
        }
    }

    fn forward(&mut self, raw: &Arc<[u8]>) {
        let Some(forwarder) = &self.forwarder else { return };
        if raw.is_empty() {
            return;
        }
        match forwarder.try_send(Arc::clone(raw)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => trace!("Forwarding queue full, dropping frame"),
            Err(TrySendError::Closed(_)) => {
                debug!("Forwarder stopped, disabling forwarding");
                self.forwarder = None;
            }
        }
    }

    // Commands

    /// Rebind a UDP action code. Invalid fields or codes are reported as a
    /// failure result.
    pub fn update_action_code(&mut self, field: &str, code: Option<u8>) -> CommandResult {
        match self.action_codes.set(field, code) {
            Ok(()) => {
                info!(field, ?code, "UDP action code updated");
                CommandResult::success(format!("{} set to {:?}", field, code))
            }
            Err(e) => {
                warn!(field, ?code, "Rejected UDP action code update: {}", e);
                CommandResult::failure(e.to_string())
            }
        }
    }

    /// Save the current state regardless of the autosave policy.
    pub fn manual_save(&mut self) -> CommandResult {
        if !self.state.session.is_valid() {
            return CommandResult::failure("No active session to save");
        }
        let request = self.save_request(MANUAL_SAVE_REASON);
        let message = format!("Saving {}", request.file_name);
        self.outbox.save(request);
        CommandResult::success(message)
    }

    pub fn set_pole_lap(&mut self, session_uid: u64, pole_lap: Option<PoleLap>) -> bool {
        self.state.set_pole_lap(session_uid, pole_lap)
    }

    fn save_request(&self, reason: &str) -> SaveRequest {
        let now = Local::now();
        let file_name = dump_file_name(&self.state, now);
        let debug = DebugInfo::new(&self.state, now, &file_name, reason);
        let dump = PostRaceDump::build(&self.state).with_debug(debug);
        SaveRequest { file_name, reason: reason.to_string(), dump }
    }

    // Packet handlers

    fn on_session(&mut self, packet: &PacketSession) {
        match self.state.check_session_change(packet) {
            SessionChange::Unchanged => {}
            SessionChange::ZeroDuration => {
                trace!("Zero-duration session packet, clearing state");
                self.state.clear();
            }
            SessionChange::NewSession { previous, current } => {
                info!(previous, current, "Session UID changed, clearing state");
                self.state.clear();
            }
        }

        if self.state.process_session_update(packet) {
            self.outbox.external_api(ExternalApiUpdate {
                session_uid: packet.header.session_uid,
                track: packet.track_id,
                track_name: packet.track_id.name().to_string(),
                session_type: packet.session_type,
                formula: packet.formula,
            });
        }
    }

    fn on_final_classification(&mut self, packet: &PacketFinalClassification) {
        let uid = packet.header.session_uid;
        if self.final_classification_uid == Some(uid) {
            debug!(session_uid = uid, "Final classification already processed");
            return;
        }
        self.final_classification_uid = Some(uid);
        self.state.process_final_classification(packet);

        let category = self
            .state
            .session
            .session_type()
            .map(|session_type| session_type.category())
            .unwrap_or(SessionCategory::Unknown);

        if self.autosave.enabled_for(category) {
            let request = self.save_request(FINAL_CLASSIFICATION_REASON);
            info!(file = %request.file_name, "Requesting post-race save");
            self.outbox.save(request);
        } else {
            debug!(?category, "Autosave disabled for session category");
        }

        if matches!(category, SessionCategory::Race | SessionCategory::Qualifying) {
            let player_position = self.state.player().and_then(|player| player.lap.position);
            self.outbox.frontend(FrontendUpdate::RaceFinished { player_position });
        }
    }

    fn on_event(&mut self, packet: &PacketEvent) {
        let handler = self.event_handlers[packet.details.kind().index()];
        handler(self, packet);
    }

    // Event handlers

    fn on_session_started(&mut self, packet: &PacketEvent) {
        info!(session_uid = packet.header.session_uid, "Session started event, clearing state");
        self.state.clear();
        self.state.record_game_event(packet);
    }

    fn on_start_lights(&mut self, packet: &PacketEvent) {
        let uid = packet.header.session_uid;
        if let EventDetails::StartLights { num_lights: 1 } = packet.details {
            if self.start_lights_clear_uid != Some(uid) {
                info!(session_uid = uid, "First start light, clearing state");
                self.start_lights_clear_uid = Some(uid);
                self.state.clear();
            }
        }
        self.state.record_game_event(packet);
    }

    fn on_buttons(&mut self, packet: &PacketEvent) {
        let EventDetails::Buttons { button_status } = packet.details else { return };
        let now = Instant::now();
        for action in ButtonAction::ALL {
            if self.action_pressed(action, button_status) && self.debouncer.on_press(action, now) {
                self.fire(action);
            }
        }
    }

    fn action_pressed(&self, action: ButtonAction, buttons: ButtonFlags) -> bool {
        let code = match action {
            ButtonAction::CustomMarker => self.action_codes.custom_marker,
            ButtonAction::TyreDelta => self.action_codes.tyre_delta,
            ButtonAction::HudToggle => self.action_codes.hud_toggle,
        };
        code.is_some_and(|code| buttons.udp_action_pressed(code))
    }

    fn fire(&mut self, action: ButtonAction) {
        match action {
            ButtonAction::CustomMarker => match self.state.insert_custom_marker() {
                Some(entry) => {
                    info!(lap = entry.lap, sector = entry.sector, "Custom marker added");
                    self.outbox.frontend(FrontendUpdate::CustomMarker(entry));
                }
                None => debug!("Custom marker ignored, player data incomplete"),
            },
            ButtonAction::TyreDelta => {
                let messages = self.state.tyre_delta_messages();
                if messages.is_empty() {
                    debug!("No tyre delta advisory available");
                } else {
                    self.outbox.frontend(FrontendUpdate::TyreDelta(messages));
                }
            }
            ButtonAction::HudToggle => self.outbox.hud(HudNotification::ToggleOverlays),
        }
    }

    fn on_fastest_lap(&mut self, packet: &PacketEvent) {
        if let EventDetails::FastestLap { vehicle_idx, lap_time } = packet.details {
            self.state.process_fastest_lap_event(vehicle_idx, lap_time);
        }
        self.state.record_game_event(packet);
    }

    fn on_retirement(&mut self, packet: &PacketEvent) {
        if let EventDetails::Retirement { vehicle_idx, .. } = packet.details {
            self.state.process_retirement(vehicle_idx);
        }
        self.state.record_game_event(packet);
    }

    fn on_overtake(&mut self, packet: &PacketEvent) {
        if let EventDetails::Overtake { overtaking_vehicle_idx, being_overtaken_vehicle_idx } =
            packet.details
        {
            if self.state.process_overtake(overtaking_vehicle_idx, being_overtaken_vehicle_idx) {
                self.state.record_game_event(packet);
            }
        }
    }

    fn on_collision(&mut self, packet: &PacketEvent) {
        if let EventDetails::Collision { vehicle1_idx, vehicle2_idx } = packet.details {
            if self.state.process_collision(vehicle1_idx, vehicle2_idx) {
                self.state.record_game_event(packet);
            }
        }
    }

    fn on_flashback(&mut self, packet: &PacketEvent) {
        if let EventDetails::Flashback { frame_identifier, session_time } = packet.details {
            self.state.process_flashback_event(frame_identifier, session_time);
        }
        self.state.record_game_event(packet);
    }

    fn on_game_event(&mut self, packet: &PacketEvent) {
        self.state.record_game_event(packet);
    }
}

/// Handler for a packet kind; car setups only when privacy allows.
fn packet_handler(kind: PacketKind, process_car_setups: bool) -> Option<PacketHandler> {
    let handler: PacketHandler = match kind {
        PacketKind::Motion => |r, p| {
            if let Packet::Motion(p) = p {
                r.state.process_motion(p);
            }
        },
        PacketKind::Session => |r, p| {
            if let Packet::Session(p) = p {
                r.on_session(p);
            }
        },
        PacketKind::LapData => |r, p| {
            if let Packet::LapData(p) = p {
                r.state.process_lap_data(p);
            }
        },
        PacketKind::Event => |r, p| {
            if let Packet::Event(p) = p {
                r.on_event(p);
            }
        },
        PacketKind::Participants => |r, p| {
            if let Packet::Participants(p) = p {
                r.state.process_participants(p);
            }
        },
        PacketKind::CarSetups if !process_car_setups => return None,
        PacketKind::CarSetups => |r, p| {
            if let Packet::CarSetups(p) = p {
                r.state.process_car_setups(p);
            }
        },
        PacketKind::CarTelemetry => |r, p| {
            if let Packet::CarTelemetry(p) = p {
                r.state.process_car_telemetry(p);
            }
        },
        PacketKind::CarStatus => |r, p| {
            if let Packet::CarStatus(p) = p {
                r.state.process_car_status(p);
            }
        },
        PacketKind::FinalClassification => |r, p| {
            if let Packet::FinalClassification(p) = p {
                r.on_final_classification(p);
            }
        },
        PacketKind::CarDamage => |r, p| {
            if let Packet::CarDamage(p) = p {
                r.state.process_car_damage(p);
            }
        },
        PacketKind::SessionHistory => |r, p| {
            if let Packet::SessionHistory(p) = p {
                r.state.process_session_history(p);
            }
        },
        PacketKind::TyreSets => |r, p| {
            if let Packet::TyreSets(p) = p {
                r.state.process_tyre_sets(p);
            }
        },
        PacketKind::TimeTrial => |r, p| {
            if let Packet::TimeTrial(p) = p {
                r.state.process_time_trial(p);
            }
        },
    };
    Some(handler)
}

fn event_handler(kind: EventKind) -> EventHandler {
    match kind {
        EventKind::Buttons => PacketRouter::on_buttons,
        EventKind::FastestLap => PacketRouter::on_fastest_lap,
        EventKind::SessionStarted => PacketRouter::on_session_started,
        EventKind::Retirement => PacketRouter::on_retirement,
        EventKind::Overtake => PacketRouter::on_overtake,
        EventKind::Collision => PacketRouter::on_collision,
        EventKind::Flashback => PacketRouter::on_flashback,
        EventKind::StartLights => PacketRouter::on_start_lights,
        EventKind::SessionEnded
        | EventKind::DrsEnabled
        | EventKind::DrsDisabled
        | EventKind::TeamMateInPits
        | EventKind::ChequeredFlag
        | EventKind::RaceWinner
        | EventKind::Penalty
        | EventKind::SpeedTrap
        | EventKind::LightsOut
        | EventKind::DriveThroughServed
        | EventKind::StopGoServed
        | EventKind::RedFlag
        | EventKind::SafetyCar => PacketRouter::on_game_event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::OutboxReceivers;
    use crate::test_utils::{
        event, final_classification, frame, lap_data, lap_row, participants, session,
    };
    use crate::types::{
        CarSetupData, PacketCarSetups, SessionType, button_flags, udp_action_mask,
    };
    use std::time::Duration;

    const UID: u64 = 0xABCD;

    fn router_with(settings: Settings) -> (PacketRouter, OutboxReceivers) {
        let (outbox, receivers) = Outbox::channel();
        (PacketRouter::new(&settings, outbox), receivers)
    }

    fn router() -> (PacketRouter, OutboxReceivers) {
        router_with(Settings::default())
    }

    fn start_race(router: &mut PacketRouter, names: &[&str]) {
        router.dispatch(&frame(Packet::Session(session(UID, SessionType::Race, 3600))));
        router.dispatch(&frame(Packet::Participants(participants(UID, names))));
        let rows = (0..names.len()).map(|idx| lap_row(idx as u8 + 1, 2)).collect();
        router.dispatch(&frame(Packet::LapData(lap_data(UID, rows))));
    }

    fn press(code: u8) -> InboundFrame {
        let mask = udp_action_mask(code).expect("valid code");
        frame(Packet::Event(event(UID, EventDetails::Buttons { button_status: ButtonFlags(mask) })))
    }

    #[test]
    fn packet_table_respects_privacy() {
        for (allowed, expect_setup) in [(false, false), (true, true)] {
            let mut settings = Settings::default();
            settings.privacy.process_car_setups = allowed;
            let (mut router, _rx) = router_with(settings);
            assert_eq!(router.packet_handlers[PacketKind::CarSetups.index()].is_some(), allowed);

            start_race(&mut router, &["A"]);
            router.dispatch(&frame(Packet::CarSetups(PacketCarSetups {
                car_setups: vec![CarSetupData { front_wing: 30, ..Default::default() }],
                ..Default::default()
            })));
            let setup = router.state().driver(0).and_then(|d| d.packets.setup.clone());
            assert_eq!(setup.is_some(), expect_setup);
        }
    }

    #[test]
    fn every_frame_counts() {
        let (mut router, _rx) = router();
        start_race(&mut router, &["A", "B"]);
        assert_eq!(router.state().packet_count(), 3);
    }

    #[test]
    fn new_session_uid_clears_and_notifies_once() {
        let (mut router, mut rx) = router();
        start_race(&mut router, &["A", "B"]);
        router.dispatch(&frame(Packet::Session(session(UID, SessionType::Race, 3600))));

        let first = rx.external_api.try_recv().expect("first session update");
        assert_eq!(first.session_uid, UID);
        assert_eq!(first.track_name, "Silverstone");
        assert!(rx.external_api.try_recv().is_err(), "only once per session");

        router.dispatch(&frame(Packet::Session(session(UID + 1, SessionType::Race, 3600))));
        assert_eq!(router.state().occupied_slots(), 0);
        assert_eq!(rx.external_api.try_recv().expect("new session").session_uid, UID + 1);
    }

    #[test]
    fn zero_duration_clears_before_applying_fields() {
        let (mut router, _rx) = router();
        start_race(&mut router, &["A", "B", "C"]);
        assert_eq!(router.state().occupied_slots(), 3);

        let mut menus = session(UID, SessionType::Race, 0);
        menus.total_laps = 57;
        router.dispatch(&frame(Packet::Session(menus)));

        assert_eq!(router.state().occupied_slots(), 0);
        assert_eq!(router.state().session.total_laps(), Some(57));
        assert!(router.state().session.is_valid());
    }

    #[test]
    fn session_started_event_clears() {
        let (mut router, _rx) = router();
        start_race(&mut router, &["A"]);
        router.dispatch(&frame(Packet::Event(event(UID, EventDetails::SessionStarted))));
        assert_eq!(router.state().occupied_slots(), 0);
        assert_eq!(router.state().race_control().len(), 1);
    }

    #[test]
    fn one_light_clears_once_per_session() {
        let (mut router, _rx) = router();
        start_race(&mut router, &["A", "B"]);
        let one_light =
            || frame(Packet::Event(event(UID, EventDetails::StartLights { num_lights: 1 })));

        router.dispatch(&one_light());
        assert_eq!(router.state().occupied_slots(), 0);

        router.dispatch(&frame(Packet::Participants(participants(UID, &["A", "B"]))));
        router.dispatch(&one_light());
        assert_eq!(router.state().occupied_slots(), 2);

        router.dispatch(&frame(Packet::Event(event(UID, EventDetails::StartLights { num_lights: 2 }))));
        assert_eq!(router.state().occupied_slots(), 2);
    }

    #[test]
    fn final_classification_is_idempotent() {
        let (mut router, mut rx) = router();
        start_race(&mut router, &["A", "B"]);
        let classification = frame(Packet::FinalClassification(final_classification(UID, &[2, 1])));

        router.dispatch(&classification);
        let first = PostRaceDump::build(router.state());
        router.dispatch(&classification);
        let second = PostRaceDump::build(router.state());

        assert_eq!(first, second);
        assert!(router.state().race_completed());

        let save = rx.save.try_recv().expect("race autosave");
        assert_eq!(save.reason, "Final Classification");
        assert!(save.file_name.starts_with("Race_Silverstone_"));
        assert!(save.dump.debug.is_some());
        assert!(rx.save.try_recv().is_err(), "saved at most once");

        let finished = rx.frontend.try_recv().expect("race finished notification");
        assert_eq!(finished, FrontendUpdate::RaceFinished { player_position: Some(2) });
        assert!(rx.frontend.try_recv().is_err());
    }

    #[test]
    fn practice_is_not_saved_or_announced_by_default() {
        let (mut router, mut rx) = router();
        router.dispatch(&frame(Packet::Session(session(UID, SessionType::Practice1, 3600))));
        router.dispatch(&frame(Packet::FinalClassification(final_classification(UID, &[1]))));
        assert!(rx.save.try_recv().is_err());
        assert!(rx.frontend.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn buttons_are_debounced() {
        let mut settings = Settings::default();
        settings.udp_action_codes.custom_marker = Some(11);
        settings.udp_action_codes.hud_toggle = Some(3);
        let (mut router, mut rx) = router_with(settings);
        start_race(&mut router, &["PLAYER"]);

        router.dispatch(&press(11));
        assert!(matches!(rx.frontend.try_recv(), Ok(FrontendUpdate::CustomMarker(_))));

        router.dispatch(&press(11));
        assert!(rx.frontend.try_recv().is_err(), "debounced");

        router.dispatch(&press(3));
        assert_eq!(rx.hud.try_recv().ok(), Some(HudNotification::ToggleOverlays));

        tokio::time::advance(Duration::from_millis(1_000)).await;
        router.dispatch(&press(11));
        assert!(matches!(rx.frontend.try_recv(), Ok(FrontendUpdate::CustomMarker(_))));
        assert_eq!(router.state().custom_markers().len(), 2);

        // Unbound button
        router.dispatch(&press(7));
        assert!(rx.frontend.try_recv().is_err());
        assert!(rx.hud.try_recv().is_err());
    }

    #[test]
    fn action_code_updates_report_failures() {
        let (mut router, _rx) = router();
        let result = router.update_action_code("warp_drive", Some(2));
        assert!(!result.is_success());
        assert!(result.message().contains("warp_drive"));

        let result = router.update_action_code("tyre_delta", Some(13));
        assert!(!result.is_success());

        let result = router.update_action_code("tyre_delta", Some(button_flags::UDP_ACTION_COUNT));
        assert!(result.is_success());
        assert_eq!(router.action_codes.tyre_delta, Some(12));
    }

    #[test]
    fn manual_save_requires_session() {
        let (mut router, mut rx) = router();
        assert!(!router.manual_save().is_success());
        assert!(rx.save.try_recv().is_err());

        start_race(&mut router, &["A"]);
        assert!(router.manual_save().is_success());
        let save = rx.save.try_recv().expect("manual save queued");
        assert_eq!(save.reason, "Manual save");
        assert!(!router.state().race_completed());
    }

    #[test]
    fn collisions_log_only_when_captured() {
        let (mut router, _rx) = router();
        start_race(&mut router, &["A", "B"]);
        let collision = |a, b| {
            frame(Packet::Event(event(UID, EventDetails::Collision { vehicle1_idx: a, vehicle2_idx: b })))
        };
        router.dispatch(&collision(0, 9));
        assert!(router.state().race_control().is_empty());
        router.dispatch(&collision(0, 1));
        assert_eq!(router.state().race_control().len(), 1);
        assert_eq!(router.state().collisions().len(), 1);
    }

    #[test]
    fn forwarding_drops_when_full() {
        let (mut router, _rx) = router();
        let (tx, mut forwarded) = mpsc::channel(1);
        router = router.with_forwarder(tx);

        start_race(&mut router, &["A"]);
        assert_eq!(forwarded.try_recv().expect("first frame").as_ref(), &UID.to_le_bytes());
        assert!(forwarded.try_recv().is_err());
        assert_eq!(router.state().packet_count(), 3);

        drop(forwarded);
        router.dispatch(&frame(Packet::LapData(lap_data(UID, vec![lap_row(1, 3)]))));
        assert!(router.forwarder.is_none());
    }
}
