//! Packet source implementations
//!
//! - [`ChannelSource`]: frames pushed by an in-process decoder over an mpsc channel
//! - [`ReplaySource`]: recorded packets played back at a fixed pace

mod channel;
mod replay;

pub use channel::{ChannelSource, FrameSender};
pub use replay::ReplaySource;
