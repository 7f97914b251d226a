//! Raw datagram forwarding
//!
//! The router hands a copy of every raw frame to a bounded queue. A dedicated
//! task drains it and retransmits each frame to every configured target.
//! Send failures are logged per target and never stop the task.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{EngineError, Result};

/// Frames queued for forwarding before new ones are dropped.
pub const FORWARD_QUEUE: usize = 256;

pub struct Forwarder {
    socket: UdpSocket,
    targets: Vec<SocketAddr>,
}

impl Forwarder {
    /// Bind an ephemeral local socket for sending.
    pub async fn bind(targets: Vec<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .await
            .map_err(|e| EngineError::config("forwarding", format!("cannot bind socket: {}", e)))?;
        Ok(Self { socket, targets })
    }

    pub fn targets(&self) -> &[SocketAddr] {
        &self.targets
    }

    /// Send one frame to every target. Returns how many sends succeeded.
    pub async fn forward(&self, frame: &[u8]) -> usize {
        let mut delivered = 0;
        for target in &self.targets {
            match self.socket.send_to(frame, target).await {
                Ok(_) => delivered += 1,
                Err(e) => debug!("Forwarding to {} failed: {}", target, e),
            }
        }
        delivered
    }

    /// Spawn the forwarding task. Returns the queue to hand to the router.
    pub fn spawn(self, cancel: CancellationToken) -> mpsc::Sender<Arc<[u8]>> {
        let (tx, mut rx) = mpsc::channel::<Arc<[u8]>>(FORWARD_QUEUE);

        tokio::spawn(async move {
            info!("Forwarding to {} target(s)", self.targets.len());
            let mut forwarded = 0u64;
            let mut failed = 0u64;
            loop {
                let frame = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    frame = rx.recv() => match frame {
                        Some(frame) => frame,
                        None => break,
                    },
                };
                let delivered = self.forward(&frame).await;
                forwarded += delivered as u64;
                if delivered < self.targets.len() {
                    failed += 1;
                    if failed.is_power_of_two() {
                        warn!("{} frames could not be forwarded to every target", failed);
                    }
                }
            }
            info!("Forwarder stopped ({} datagrams sent)", forwarded);
        });

        tx
    }
}
