//! Session state engine for F1 UDP telemetry.
//!
//! Paddock ingests decoded telemetry packets from a racing game and keeps a
//! consistent, queryable model of the current session for every car.
//!
//! # Features
//!
//! - **Single writer**: one engine task owns the state; readers go through channels
//! - **Derived records**: fastest lap and sectors, overtakes, collisions, race control
//! - **Lap snapshots**: per-lap history that survives flashbacks
//! - **Projections**: race table, stream overlay, driver info and the post-race dump
//!
//! The binary UDP layout is not part of this crate. A decoder turns datagrams
//! into [`types::Packet`] values and hands them over through a [`PacketSource`].
//!
//! ## Example (replay)
//!
//! ```rust,no_run
//! use paddock::{Paddock, Settings};
//! use paddock::sources::ReplaySource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     paddock::logging::init("paddock=info");
//!
//!     let settings = Settings::load("settings.yaml")?;
//!     let source = ReplaySource::open("session.jsonl")?;
//!     let paddock = Paddock::launch(&settings, source).await?;
//!
//!     paddock.engine.source_finished().await?;
//!     if let Some(table) = paddock.engine.race_table().await? {
//!         println!("{}", serde_json::to_string_pretty(&table)?);
//!     }
//!     paddock.shutdown();
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod format;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Session state and views
pub mod dispatch;
pub mod projection;
pub mod state;

// Tasks and channels
pub mod autosave;
pub mod broadcast;
pub mod engine;
pub mod forward;
pub mod logging;
pub mod messages;
pub mod pole_lap;
pub mod source;
pub mod sources;
pub mod watchdog;

// Core exports
pub use config::Settings;
pub use error::*;

// Engine exports
pub use broadcast::Broadcasts;
pub use dispatch::{CommandResult, PacketRouter};
pub use engine::{Engine, EngineHandle};
pub use pole_lap::PoleLapLookup;
pub use source::PacketSource;
pub use state::SessionState;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

use forward::Forwarder;
use messages::{ExternalApiUpdate, FrontendUpdate, HudNotification, Outbox};
use watchdog::Watchdog;

/// A running engine with every supporting task wired up.
///
/// Launching spawns the engine, the connection watchdog, the broadcast
/// publishers, the autosave writer and (when targets are configured) the
/// forwarder. All of them stop on [`Paddock::shutdown`].
#[derive(Debug)]
pub struct Paddock {
    pub engine: EngineHandle,
    pub broadcasts: Broadcasts,
    /// Whether packets arrived within the connection timeout
    pub connected: watch::Receiver<bool>,
    pub frontend: mpsc::UnboundedReceiver<FrontendUpdate>,
    pub hud: mpsc::UnboundedReceiver<HudNotification>,
    /// Session announcements; `None` when a pole-lap lookup consumes them
    pub external_api: Option<mpsc::UnboundedReceiver<ExternalApiUpdate>>,
    cancel: CancellationToken,
}

impl Paddock {
    /// Launch the engine over `source`.
    pub async fn launch<S>(settings: &Settings, source: S) -> Result<Self>
    where
        S: PacketSource,
    {
        settings.validate()?;
        let cancel = CancellationToken::new();
        let (outbox, receivers) = Outbox::channel();

        let (watchdog, connected) =
            Watchdog::spawn(settings.timing.connection_timeout(), cancel.clone());
        let mut router = PacketRouter::new(settings, outbox).with_watchdog(watchdog);

        if !settings.forwarding.targets.is_empty() {
            let forwarder = Forwarder::bind(settings.forwarding.targets.clone()).await?;
            router = router.with_forwarder(forwarder.spawn(cancel.clone()));
        }

        autosave::spawn_writer(settings.autosave.directory.clone(), receivers.save, cancel.clone());

        let engine = Engine::spawn(source, router, cancel.clone());
        let broadcasts = Broadcasts::spawn(&engine, &settings.timing, cancel.clone());

        info!("Engine launched");
        Ok(Self {
            engine,
            broadcasts,
            connected,
            frontend: receivers.frontend,
            hud: receivers.hud,
            external_api: Some(receivers.external_api),
            cancel,
        })
    }

    /// Launch the engine and resolve pole laps through `lookup`.
    pub async fn launch_with_pole_laps<S, L>(settings: &Settings, source: S, lookup: L) -> Result<Self>
    where
        S: PacketSource,
        L: PoleLapLookup,
    {
        let mut paddock = Self::launch(settings, source).await?;
        if let Some(updates) = paddock.external_api.take() {
            pole_lap::spawn_lookup_task(lookup, updates, paddock.engine.clone(), paddock.cancel.clone());
        }
        Ok(paddock)
    }

    /// Stop every task started by this launch.
    pub fn shutdown(&self) {
        info!("Shutting down");
        self.cancel.cancel();
    }
}
