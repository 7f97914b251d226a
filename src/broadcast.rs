//! Periodic document broadcasts
//!
//! Each publisher wakes on an absolute deadline, asks the engine for a fresh
//! document and publishes it on a `watch` channel. Slow consumers only ever
//! see the latest document. After a missed deadline (a stalled engine or a
//! slow build) the schedule resynchronises to now instead of bursting.

use futures::{Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, Instant, sleep_until};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::TimingSettings;
use crate::engine::EngineHandle;
use crate::projection::{RaceTableDocument, StreamOverlay};
use crate::{EngineError, Result};

/// Latest published document; `None` until the first one is available.
pub type Published<T> = watch::Receiver<Option<Arc<T>>>;

/// Receivers for the engine's periodic documents.
#[derive(Debug, Clone)]
pub struct Broadcasts {
    pub race_table: Published<RaceTableDocument>,
    pub stream_overlay: Published<StreamOverlay>,
}

impl Broadcasts {
    /// Start the race-table and stream-overlay publishers.
    pub fn spawn(engine: &EngineHandle, timing: &TimingSettings, cancel: CancellationToken) -> Self {
        let race_table_engine = engine.clone();
        let race_table = spawn_publisher(
            "race-table",
            timing.race_table_interval(),
            cancel.clone(),
            move || {
                let engine = race_table_engine.clone();
                async move { engine.race_table().await }
            },
        );

        let overlay_engine = engine.clone();
        let stream_overlay = spawn_publisher(
            "stream-overlay",
            timing.stream_overlay_interval(),
            cancel,
            move || {
                let engine = overlay_engine.clone();
                async move { engine.stream_overlay().await }
            },
        );

        Self { race_table, stream_overlay }
    }
}

/// Spawn a publisher that calls `produce` every `period`.
///
/// The publisher stops on cancellation or when `produce` reports that the
/// engine has stopped. Other errors are logged and the tick is skipped.
pub fn spawn_publisher<T, F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut produce: F,
) -> Published<T>
where
    T: Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<T>>> + Send,
{
    let (tx, rx) = watch::channel(None);

    tokio::spawn(async move {
        info!(broadcast = name, "Publisher started ({:?})", period);
        let mut deadline = Instant::now() + period;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep_until(deadline) => {}
            }

            match produce().await {
                Ok(document) => {
                    tx.send_replace(document.map(Arc::new));
                }
                Err(EngineError::EngineStopped) => {
                    debug!(broadcast = name, "Engine stopped");
                    break;
                }
                Err(e) => warn!(broadcast = name, "Failed to build document: {}", e),
            }

            deadline = next_deadline(deadline, period, Instant::now());
        }

        info!(broadcast = name, "Publisher stopped");
    });

    rx
}

/// Next deadline after `previous`, resynchronised to `now` when it was missed.
fn next_deadline(previous: Instant, period: Duration, now: Instant) -> Instant {
    let next = previous + period;
    if next < now {
        trace!("Broadcast tick missed by {:?}, resynchronising", now - next);
        now
    } else {
        next
    }
}

/// Stream of published documents, skipping the initial empty value.
pub fn updates<T>(published: Published<T>) -> impl Stream<Item = Arc<T>> + Send + 'static
where
    T: Send + Sync + 'static,
{
    WatchStream::new(published).filter_map(|document| async move { document })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::mpsc;

    #[test]
    fn deadlines_advance_by_period_when_on_time() {
        let start = Instant::now();
        let period = Duration::from_millis(100);
        let next = next_deadline(start, period, start + Duration::from_millis(20));
        assert_eq!(next, start + period);
    }

    #[test]
    fn missed_deadline_resyncs_to_now() {
        let start = Instant::now();
        let period = Duration::from_millis(100);
        let now = start + Duration::from_millis(450);
        assert_eq!(next_deadline(start, period, now), now);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_build_does_not_burst() {
        let start = Instant::now();
        let cancel = CancellationToken::new();
        let (ticks_tx, mut ticks) = mpsc::unbounded_channel();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let _published = spawn_publisher("test", Duration::from_millis(100), cancel.clone(), move || {
            let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let ticks_tx = ticks_tx.clone();
            async move {
                let _ = ticks_tx.send(Instant::now() - start);
                if call == 2 {
                    tokio::time::sleep(Duration::from_millis(350)).await;
                }
                Ok(Some(call))
            }
        });

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(ticks.recv().await.expect("publisher running"));
        }
        cancel.cancel();

        let millis: Vec<u128> = seen.iter().map(Duration::as_millis).collect();
        assert_eq!(millis, vec![100, 200, 550, 650]);
    }

    #[tokio::test(start_paused = true)]
    async fn updates_skip_empty_and_stop_with_engine() {
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let published = spawn_publisher("test", Duration::from_millis(10), cancel, move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match call {
                    0 => Ok(None),
                    1 => Ok(Some("table")),
                    _ => Err(EngineError::EngineStopped),
                }
            }
        });

        let collected: Vec<_> = updates(published).collect().await;
        assert_eq!(collected, vec![Arc::new("table")]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
