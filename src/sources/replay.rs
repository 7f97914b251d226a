//! Replay source for recorded packet streams

use std::collections::VecDeque;
use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::source::PacketSource;
use crate::types::{InboundFrame, Packet};
use crate::{EngineError, Result};

/// Replays decoded packets in order, optionally paced.
///
/// Recordings are JSON lines, one serialized [`Packet`] per line. Replayed
/// frames carry no raw payload and are therefore never forwarded.
pub struct ReplaySource {
    frames: VecDeque<InboundFrame>,

    /// Frame pacing; `None` replays as fast as the engine consumes
    interval: Option<Interval>,

    total_frames: usize,
}

impl ReplaySource {
    pub fn from_frames(frames: impl IntoIterator<Item = InboundFrame>) -> Self {
        let frames: VecDeque<_> = frames.into_iter().collect();
        let total_frames = frames.len();
        Self { frames, interval: None, total_frames }
    }

    pub fn from_packets(packets: impl IntoIterator<Item = Packet>) -> Self {
        Self::from_frames(packets.into_iter().map(InboundFrame::decoded))
    }

    /// Load a JSON-lines recording. Blank lines are skipped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::source_failed_with(path.display().to_string(), Box::new(e)))?;

        let mut packets = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let packet: Packet = serde_json::from_str(line).map_err(|e| {
                EngineError::source_failed_with(
                    format!("{} line {}", path.display(), line_no + 1),
                    Box::new(e),
                )
            })?;
            packets.push(packet);
        }

        info!("Opened recording {}: {} packets", path.display(), packets.len());
        Ok(Self::from_packets(packets))
    }

    /// Emit one frame per `period`. Must be called within a Tokio runtime.
    pub fn paced(mut self, period: Duration) -> Self {
        let mut pacing = interval(period);
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(pacing);
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }
}

#[async_trait::async_trait]
impl PacketSource for ReplaySource {
    async fn next_frame(&mut self) -> Result<Option<InboundFrame>> {
        if self.frames.is_empty() {
            debug!("Reached end of replay");
            return Ok(None);
        }

        if let Some(pacing) = self.interval.as_mut() {
            pacing.tick().await;
        }

        let frame = self.frames.pop_front();
        trace!("Replay frame {}/{}", self.total_frames - self.frames.len(), self.total_frames);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PacketKind, PacketMotion, PacketSession, SessionType};
    use std::io::Write;

    fn session_line() -> String {
        let packet = Packet::Session(PacketSession {
            session_type: SessionType::Race,
            session_duration: 3600,
            ..Default::default()
        });
        serde_json::to_string(&packet).expect("serializable")
    }

    #[tokio::test]
    async fn plays_recording_in_order() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let motion = serde_json::to_string(&Packet::Motion(PacketMotion::default()))
            .expect("serializable");
        writeln!(file, "{}\n\n{}", session_line(), motion).expect("write recording");

        let mut source = ReplaySource::open(file.path()).expect("valid recording");
        assert_eq!(source.total_frames(), 2);

        let first = source.next_frame().await.expect("ok").expect("frame");
        assert_eq!(first.packet.kind(), PacketKind::Session);
        assert!(first.raw.is_empty());
        let second = source.next_frame().await.expect("ok").expect("frame");
        assert_eq!(second.packet.kind(), PacketKind::Motion);
        assert!(source.next_frame().await.expect("ok").is_none());
    }

    #[test]
    fn bad_line_is_reported_with_its_number() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{}\nnot json", session_line()).expect("write recording");

        let error = ReplaySource::open(file.path()).err().expect("invalid recording");
        assert!(error.to_string().contains("line 2"));
        assert!(error.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_spaces_frames() {
        let packets = (0..3).map(|_| Packet::Motion(PacketMotion::default()));
        let mut source = ReplaySource::from_packets(packets).paced(Duration::from_millis(50));

        let start = tokio::time::Instant::now();
        while source.next_frame().await.expect("ok").is_some() {}
        // The first tick completes immediately
        assert_eq!(start.elapsed(), Duration::from_millis(100));
        assert_eq!(source.remaining(), 0);
    }
}
