//! Packet source trait: the seam to the wire decoder

use crate::Result;
use crate::types::InboundFrame;

/// Trait for decoded packet sources
///
/// The wire decoder lives outside this crate. Whatever receives datagrams and
/// decodes them implements this trait, and the engine pulls frames from it.
/// Sources handle their own timing: a live socket waits for the next
/// datagram, a replay paces itself.
#[async_trait::async_trait]
pub trait PacketSource: Send + 'static {
    /// Get the next decoded frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Stream ended (normal termination)
    /// - `Err(e)` - Transient error; the engine backs off and retries
    async fn next_frame(&mut self) -> Result<Option<InboundFrame>>;
}
