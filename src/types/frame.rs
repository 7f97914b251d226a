//! Inbound frame type for the stream-based architecture

use std::sync::Arc;

use super::packets::Packet;

/// One received datagram together with its decoded packet
///
/// This is the fundamental data unit that flows from the decoder into the
/// engine. The raw bytes are kept for forwarding.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    /// Raw datagram (zero-copy via Arc)
    pub raw: Arc<[u8]>,

    /// Decoded packet
    pub packet: Packet,
}

impl InboundFrame {
    /// Create a new inbound frame
    pub fn new(raw: Vec<u8>, packet: Packet) -> Self {
        Self { raw: raw.into(), packet }
    }

    /// Wrap an already decoded packet with no raw payload
    pub fn decoded(packet: Packet) -> Self {
        Self { raw: Arc::from(Vec::new()), packet }
    }
}
