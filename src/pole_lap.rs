//! Real-world pole-lap lookup
//!
//! Every new session produces an [`ExternalApiUpdate`]. The lookup task
//! resolves it through a pluggable [`PoleLapLookup`] and feeds the result back
//! through the engine, which ignores results for sessions that are no longer
//! current.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::EngineError;
use crate::engine::EngineHandle;
use crate::messages::ExternalApiUpdate;
use crate::state::PoleLap;

/// Source of real-world pole laps (a web API, a local table, ...).
#[async_trait::async_trait]
pub trait PoleLapLookup: Send + Sync + 'static {
    /// Pole lap for the session's track and formula, if one is known.
    async fn lookup(&self, update: &ExternalApiUpdate) -> anyhow::Result<Option<PoleLap>>;
}

/// Spawn the lookup task over the outbox's external-api queue.
pub fn spawn_lookup_task<L>(
    lookup: L,
    mut updates: mpsc::UnboundedReceiver<ExternalApiUpdate>,
    engine: EngineHandle,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    L: PoleLapLookup,
{
    tokio::spawn(async move {
        loop {
            let update = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                update = updates.recv() => match update {
                    Some(update) => update,
                    None => break,
                },
            };

            if update.session_type.is_time_trial() {
                debug!(session_uid = update.session_uid, "No pole lap lookup for time trial");
                continue;
            }

            let pole_lap = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = lookup.lookup(&update) => match result {
                    Ok(pole_lap) => pole_lap,
                    Err(e) => {
                        let detail = format!("{:#}", e);
                        let error = lookup_error(&update, e);
                        warn!(retryable = error.is_retryable(), "{}: {}", error, detail);
                        debug!(suggestions = ?error.recovery_suggestions(), "Pole lap lookup skipped");
                        continue;
                    }
                },
            };

            let Some(pole_lap) = pole_lap else {
                debug!(track = %update.track_name, "No pole lap known");
                continue;
            };

            match engine.set_pole_lap(update.session_uid, Some(pole_lap)).await {
                Ok(true) => info!(track = %update.track_name, "Pole lap applied"),
                Ok(false) => debug!(session_uid = update.session_uid, "Pole lap discarded, session changed"),
                Err(EngineError::EngineStopped) => break,
                Err(e) => warn!("Failed to apply pole lap: {}", e),
            }
        }
        debug!("Pole lap lookup task stopped");
    })
}

fn lookup_error(update: &ExternalApiUpdate, error: anyhow::Error) -> EngineError {
    EngineError::lookup_failed(format!("pole lap for {}", update.track_name), error.into())
}
