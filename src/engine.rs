//! Engine task: the single writer of the session state
//!
//! The engine task owns the [`PacketRouter`] (and through it the store). It
//! selects over cancellation, commands and the packet source. Every packet
//! update runs to completion before the next command is served, so command
//! replies always reflect state as of the last complete packet.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::dispatch::{CommandResult, PacketRouter};
use crate::projection::{DriverInfoView, PostRaceDump, RaceTableDocument, StreamOverlay};
use crate::source::PacketSource;
use crate::state::PoleLap;
use crate::{EngineError, Result};

const COMMAND_QUEUE: usize = 64;
const MAX_ERRORS: u32 = 10;

/// Requests served by the engine task.
#[derive(Debug)]
pub enum EngineCommand {
    RaceTable(oneshot::Sender<Option<RaceTableDocument>>),
    StreamOverlay(oneshot::Sender<Option<StreamOverlay>>),
    DriverInfo { index: usize, reply: oneshot::Sender<Option<DriverInfoView>> },
    PostRaceDump(oneshot::Sender<Option<PostRaceDump>>),
    ManualSave(oneshot::Sender<CommandResult>),
    SetPoleLap { session_uid: u64, pole_lap: Option<PoleLap>, reply: oneshot::Sender<bool> },
    UpdateActionCode { field: String, code: Option<u8>, reply: oneshot::Sender<CommandResult> },
}

/// Cloneable handle to a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    source_finished: watch::Receiver<bool>,
    cancel: CancellationToken,
}

impl EngineHandle {
    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> EngineCommand) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands.send(command(reply)).await.map_err(|_| EngineError::EngineStopped)?;
        response.await.map_err(|_| EngineError::EngineStopped)
    }

    /// Race table (or time-trial view); `None` before the first session packet.
    pub async fn race_table(&self) -> Result<Option<RaceTableDocument>> {
        self.request(EngineCommand::RaceTable).await
    }

    pub async fn stream_overlay(&self) -> Result<Option<StreamOverlay>> {
        self.request(EngineCommand::StreamOverlay).await
    }

    pub async fn driver_info(&self, index: usize) -> Result<Option<DriverInfoView>> {
        self.request(|reply| EngineCommand::DriverInfo { index, reply }).await
    }

    /// Post-race document as it would be written now, without a debug block.
    pub async fn post_race_dump(&self) -> Result<Option<PostRaceDump>> {
        self.request(EngineCommand::PostRaceDump).await
    }

    pub async fn manual_save(&self) -> Result<CommandResult> {
        self.request(EngineCommand::ManualSave).await
    }

    /// Returns whether the pole lap was applied to the current session.
    pub async fn set_pole_lap(&self, session_uid: u64, pole_lap: Option<PoleLap>) -> Result<bool> {
        self.request(|reply| EngineCommand::SetPoleLap { session_uid, pole_lap, reply }).await
    }

    pub async fn update_action_code(
        &self,
        field: impl Into<String>,
        code: Option<u8>,
    ) -> Result<CommandResult> {
        let field = field.into();
        self.request(|reply| EngineCommand::UpdateActionCode { field, code, reply }).await
    }

    /// Wait until the packet source has ended (or failed permanently).
    ///
    /// The engine keeps serving commands afterwards until cancelled.
    pub async fn source_finished(&self) -> Result<()> {
        let mut finished = self.source_finished.clone();
        finished.wait_for(|done| *done).await.map_err(|_| EngineError::EngineStopped)?;
        Ok(())
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

pub struct Engine;

impl Engine {
    /// Spawn the engine task over `source`.
    ///
    /// The task stops when `cancel` fires or every handle is dropped.
    pub fn spawn<S>(source: S, router: PacketRouter, cancel: CancellationToken) -> EngineHandle
    where
        S: PacketSource,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (finished_tx, finished_rx) = watch::channel(false);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            Self::run(source, router, command_rx, finished_tx, task_cancel).await;
        });

        EngineHandle { commands: command_tx, source_finished: finished_rx, cancel }
    }

    async fn run<S>(
        mut source: S,
        mut router: PacketRouter,
        mut commands: mpsc::Receiver<EngineCommand>,
        source_finished: watch::Sender<bool>,
        cancel: CancellationToken,
    ) where
        S: PacketSource,
    {
        info!("Engine task started");
        let mut frame_count = 0u64;
        let mut error_count = 0u32;
        let mut source_open = true;
        let mut retry_at: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Engine cancelled");
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => Self::handle_command(&mut router, command),
                    None => {
                        debug!("All engine handles dropped, shutting down");
                        break;
                    }
                },
                _ = sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                    retry_at = None;
                }
                result = source.next_frame(), if source_open && retry_at.is_none() => match result {
                    Ok(Some(frame)) => {
                        frame_count += 1;
                        error_count = 0;
                        trace!("Frame {}: {:?}", frame_count, frame.packet.kind());
                        router.dispatch(&frame);
                    }
                    Ok(None) => {
                        info!("Packet source ended after {} frames", frame_count);
                        source_open = false;
                        source_finished.send_replace(true);
                    }
                    Err(e) => {
                        error_count += 1;
                        error!("Packet source error ({}/{}): {}", error_count, MAX_ERRORS, e);

                        if error_count >= MAX_ERRORS {
                            error!("Too many packet source errors, no longer reading");
                            source_open = false;
                            source_finished.send_replace(true);
                        } else {
                            // Exponential backoff: 100ms, 200ms, 400ms, ...
                            let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                            retry_at = Some(Instant::now() + backoff);
                        }
                    }
                },
            }
        }

        info!("Engine task ended (processed {} frames)", frame_count);
    }

    fn handle_command(router: &mut PacketRouter, command: EngineCommand) {
        match command {
            EngineCommand::RaceTable(reply) => {
                respond(reply, RaceTableDocument::build(router.state()), "race table");
            }
            EngineCommand::StreamOverlay(reply) => {
                respond(reply, StreamOverlay::build(router.state()), "stream overlay");
            }
            EngineCommand::DriverInfo { index, reply } => {
                respond(reply, DriverInfoView::build(router.state(), index), "driver info");
            }
            EngineCommand::PostRaceDump(reply) => {
                let state = router.state();
                let dump = state.session.is_valid().then(|| PostRaceDump::build(state));
                respond(reply, dump, "post-race dump");
            }
            EngineCommand::ManualSave(reply) => {
                respond(reply, router.manual_save(), "manual save");
            }
            EngineCommand::SetPoleLap { session_uid, pole_lap, reply } => {
                let applied = router.set_pole_lap(session_uid, pole_lap);
                if !applied {
                    warn!(session_uid, "Pole lap arrived for a session that is no longer current");
                }
                respond(reply, applied, "pole lap");
            }
            EngineCommand::UpdateActionCode { field, code, reply } => {
                respond(reply, router.update_action_code(&field, code), "action code");
            }
        }
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, what: &'static str) {
    if reply.send(value).is_err() {
        debug!(command = what, "Caller went away before the reply");
    }
}
