//! Connection liveness monitor
//!
//! Every raw frame kicks the watchdog. When no kick arrives within the
//! timeout the `connected` flag flips to false; the next kick flips it back.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cheap handle used by the router to signal packet arrival.
#[derive(Debug, Clone)]
pub struct WatchdogHandle {
    notify: Arc<Notify>,
}

impl WatchdogHandle {
    pub fn kick(&self) {
        self.notify.notify_one();
    }
}

pub struct Watchdog;

impl Watchdog {
    /// Spawn the monitor task. The returned receiver starts out disconnected.
    pub fn spawn(
        timeout: Duration,
        cancel: CancellationToken,
    ) -> (WatchdogHandle, watch::Receiver<bool>) {
        let notify = Arc::new(Notify::new());
        let (connected_tx, connected_rx) = watch::channel(false);

        let task_notify = Arc::clone(&notify);
        tokio::spawn(async move {
            Self::monitor(task_notify, connected_tx, timeout, cancel).await;
        });

        (WatchdogHandle { notify }, connected_rx)
    }

    async fn monitor(
        notify: Arc<Notify>,
        connected: watch::Sender<bool>,
        timeout: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            let is_connected = *connected.borrow();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = notify.notified() => {
                    if !is_connected {
                        info!("Telemetry connected");
                        connected.send_replace(true);
                    }
                }
                _ = tokio::time::sleep(timeout), if is_connected => {
                    warn!("No telemetry received for {:?}, marking disconnected", timeout);
                    connected.send_replace(false);
                }
            }
        }
        info!("Watchdog stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn flips_on_timeout_and_back_on_kick() {
        let cancel = CancellationToken::new();
        let (handle, mut connected) = Watchdog::spawn(Duration::from_millis(500), cancel.clone());
        assert!(!*connected.borrow());

        handle.kick();
        connected.changed().await.expect("watchdog running");
        assert!(*connected.borrow_and_update());

        let started = Instant::now();
        connected.changed().await.expect("watchdog running");
        assert!(!*connected.borrow_and_update());
        assert!(started.elapsed() >= Duration::from_millis(500));

        handle.kick();
        connected.changed().await.expect("watchdog running");
        assert!(*connected.borrow_and_update());

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn steady_kicks_keep_connection() {
        let cancel = CancellationToken::new();
        let (handle, mut connected) = Watchdog::spawn(Duration::from_millis(500), cancel.clone());
        handle.kick();
        connected.changed().await.expect("watchdog running");
        connected.borrow_and_update();

        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.kick();
        }
        assert!(!connected.has_changed().expect("watchdog running"));
        assert!(*connected.borrow());
        cancel.cancel();
    }
}
