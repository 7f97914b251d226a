//! Outbound messages to external collaborators
//!
//! Each topic is an unbounded tokio mpsc queue. Sending is fire-and-forget:
//! a dropped receiver is logged at debug level and never affects ingestion.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::projection::PostRaceDump;
use crate::state::{CustomMarkerEntry, TyreDeltaMessage};
use crate::types::{Formula, SessionType, TrackId};

/// Session-change notification, consumed by the pole-lap lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalApiUpdate {
    pub session_uid: u64,
    pub track: TrackId,
    pub track_name: String,
    pub session_type: SessionType,
    pub formula: Formula,
}

/// Notification for the web front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message-type", content = "message", rename_all = "kebab-case")]
pub enum FrontendUpdate {
    CustomMarker(CustomMarkerEntry),
    TyreDelta(Vec<TyreDeltaMessage>),
    RaceFinished { player_position: Option<u8> },
}

/// Request for the on-screen overlay process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HudNotification {
    ToggleOverlays,
}

/// Post-race dump to be written by the autosave task.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub file_name: String,
    pub reason: String,
    pub dump: PostRaceDump,
}

/// Sending half of every outbound topic.
#[derive(Debug, Clone)]
pub struct Outbox {
    external_api: mpsc::UnboundedSender<ExternalApiUpdate>,
    frontend: mpsc::UnboundedSender<FrontendUpdate>,
    hud: mpsc::UnboundedSender<HudNotification>,
    save: mpsc::UnboundedSender<SaveRequest>,
}

/// Receiving half of every outbound topic.
#[derive(Debug)]
pub struct OutboxReceivers {
    pub external_api: mpsc::UnboundedReceiver<ExternalApiUpdate>,
    pub frontend: mpsc::UnboundedReceiver<FrontendUpdate>,
    pub hud: mpsc::UnboundedReceiver<HudNotification>,
    pub save: mpsc::UnboundedReceiver<SaveRequest>,
}

impl Outbox {
    pub fn channel() -> (Outbox, OutboxReceivers) {
        let (external_api_tx, external_api_rx) = mpsc::unbounded_channel();
        let (frontend_tx, frontend_rx) = mpsc::unbounded_channel();
        let (hud_tx, hud_rx) = mpsc::unbounded_channel();
        let (save_tx, save_rx) = mpsc::unbounded_channel();
        (
            Outbox { external_api: external_api_tx, frontend: frontend_tx, hud: hud_tx, save: save_tx },
            OutboxReceivers {
                external_api: external_api_rx,
                frontend: frontend_rx,
                hud: hud_rx,
                save: save_rx,
            },
        )
    }

    pub fn external_api(&self, update: ExternalApiUpdate) {
        deliver(&self.external_api, update, "external-api-update");
    }

    pub fn frontend(&self, update: FrontendUpdate) {
        deliver(&self.frontend, update, "frontend-update");
    }

    pub fn hud(&self, notification: HudNotification) {
        deliver(&self.hud, notification, "hud-notifier");
    }

    pub fn save(&self, request: SaveRequest) {
        deliver(&self.save, request, "save-request");
    }
}

fn deliver<T>(tx: &mpsc::UnboundedSender<T>, message: T, topic: &'static str) {
    if tx.send(message).is_err() {
        debug!(topic, "No receiver for outbound message, dropping it");
    }
}
