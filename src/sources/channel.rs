//! Channel-backed source for decoders running in their own task

use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;
use crate::source::PacketSource;
use crate::types::InboundFrame;

/// Sending half handed to the decoder.
pub type FrameSender = mpsc::Sender<InboundFrame>;

/// Source fed by a decoder task. The stream ends when every sender is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    frames: mpsc::Receiver<InboundFrame>,
}

impl ChannelSource {
    /// Bounded source; the decoder waits when the engine falls `capacity` frames behind.
    pub fn new(capacity: usize) -> (FrameSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { frames: rx })
    }
}

#[async_trait::async_trait]
impl PacketSource for ChannelSource {
    async fn next_frame(&mut self) -> Result<Option<InboundFrame>> {
        let frame = self.frames.recv().await;
        if frame.is_none() {
            debug!("All frame senders dropped");
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Packet, PacketKind, PacketMotion};

    #[tokio::test]
    async fn ends_when_senders_drop() {
        let (tx, mut source) = ChannelSource::new(4);
        tx.send(InboundFrame::decoded(Packet::Motion(PacketMotion::default())))
            .await
            .expect("source alive");
        drop(tx);

        let frame = source.next_frame().await.expect("no error").expect("one frame");
        assert_eq!(frame.packet.kind(), PacketKind::Motion);
        assert!(source.next_frame().await.expect("no error").is_none());
    }
}
