//! Session-wide facts
//!
//! Everything here comes from the session packet, the final classification,
//! the time-trial packet, or the external pole-lap lookup. The pit-time-loss
//! tables are static for the lifetime of the engine and survive every clear.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::PitTimeLossTables;
use crate::types::{
    Formula, PacketFinalClassification, PacketHeader, PacketSession, PacketTimeTrial,
    SafetyCarStatus, SessionType, TrackId, WeatherForecastSample,
};

/// Most recent real-world pole lap for the current track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleLap {
    pub driver: String,
    pub team: String,
    pub lap_time_ms: u32,
    pub season: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    pit_time_loss: Arc<PitTimeLossTables>,
    pub session_uid: Option<u64>,
    pub packet_format: Option<u16>,
    pub game_year: Option<u8>,
    /// Last session packet applied
    pub packet: Option<PacketSession>,
    pub final_classification: Option<PacketFinalClassification>,
    pub time_trial: Option<PacketTimeTrial>,
    pub pole_lap: Option<PoleLap>,
}

impl SessionInfo {
    pub fn new(pit_time_loss: Arc<PitTimeLossTables>) -> Self {
        Self { pit_time_loss, ..Default::default() }
    }

    /// Reset every session-scoped field, keeping the pit-time-loss tables.
    pub fn clear(&mut self) {
        *self = Self::new(Arc::clone(&self.pit_time_loss));
    }

    pub fn apply(&mut self, packet: &PacketSession) {
        self.record_header(&packet.header);
        self.packet = Some(packet.clone());
    }

    fn record_header(&mut self, header: &PacketHeader) {
        self.session_uid = Some(header.session_uid);
        self.packet_format = Some(header.packet_format);
        self.game_year = Some(header.game_year);
    }

    /// A session packet has been applied.
    pub fn is_valid(&self) -> bool {
        self.packet.is_some()
    }

    /// A final classification has been recorded.
    pub fn session_ended(&self) -> bool {
        self.final_classification.is_some()
    }

    /// The last session packet reported an offline game.
    pub fn is_offline(&self) -> bool {
        self.packet.as_ref().is_some_and(|packet| !packet.network_game)
    }

    pub fn track(&self) -> Option<TrackId> {
        self.packet.as_ref().map(|packet| packet.track_id)
    }

    pub fn session_type(&self) -> Option<SessionType> {
        self.packet.as_ref().map(|packet| packet.session_type)
    }

    pub fn formula(&self) -> Option<Formula> {
        self.packet.as_ref().map(|packet| packet.formula)
    }

    pub fn is_time_trial(&self) -> bool {
        self.session_type().is_some_and(SessionType::is_time_trial)
    }

    pub fn total_laps(&self) -> Option<u8> {
        self.packet.as_ref().map(|packet| packet.total_laps)
    }

    pub fn track_length(&self) -> Option<u16> {
        self.packet.as_ref().map(|packet| packet.track_length)
    }

    pub fn safety_car_status(&self) -> Option<SafetyCarStatus> {
        self.packet.as_ref().map(|packet| packet.safety_car_status)
    }

    pub fn is_spectating(&self) -> bool {
        self.packet.as_ref().is_some_and(|packet| packet.is_spectating)
    }

    pub fn spectator_car_index(&self) -> Option<u8> {
        self.packet.as_ref().filter(|packet| packet.is_spectating).map(|p| p.spectator_car_index)
    }

    pub fn weather_forecast(&self) -> &[WeatherForecastSample] {
        self.packet.as_ref().map(|packet| packet.weather_forecast_samples.as_slice()).unwrap_or(&[])
    }

    pub fn pit_speed_limit(&self) -> Option<u8> {
        self.packet.as_ref().map(|packet| packet.pit_speed_limit)
    }

    pub fn pit_window(&self) -> Option<(u8, u8)> {
        self.packet
            .as_ref()
            .map(|packet| (packet.pit_stop_window_ideal_lap, packet.pit_stop_window_latest_lap))
    }

    /// Seconds lost to a pit stop at the current track for the current formula.
    pub fn pit_time_loss(&self) -> Option<f32> {
        let track = self.track()?;
        let class = self.formula()?.vehicle_class();
        self.pit_time_loss.lookup(class, track.name())
    }

    pub fn pit_time_loss_tables(&self) -> &Arc<PitTimeLossTables> {
        &self.pit_time_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tables() -> Arc<PitTimeLossTables> {
        Arc::new(PitTimeLossTables {
            f1: HashMap::from([("Silverstone".to_string(), 20.5)]),
            f2: HashMap::from([("Silverstone".to_string(), 24.0)]),
        })
    }

    #[test]
    fn pit_time_loss_follows_formula() {
        let mut info = SessionInfo::new(tables());
        assert_eq!(info.pit_time_loss(), None);

        info.apply(&PacketSession { track_id: TrackId(7), ..Default::default() });
        assert_eq!(info.pit_time_loss(), Some(20.5));

        info.apply(&PacketSession { track_id: TrackId(7), formula: Formula::F2, ..Default::default() });
        assert_eq!(info.pit_time_loss(), Some(24.0));
    }

    #[test]
    fn clear_preserves_tables_only() {
        let tables = tables();
        let mut info = SessionInfo::new(Arc::clone(&tables));
        info.apply(&PacketSession {
            header: PacketHeader { session_uid: 9, ..Default::default() },
            ..Default::default()
        });
        info.final_classification = Some(PacketFinalClassification::default());
        assert!(info.is_valid());
        assert!(info.session_ended());

        info.clear();
        assert!(!info.is_valid());
        assert!(!info.session_ended());
        assert_eq!(info.session_uid, None);
        assert!(Arc::ptr_eq(info.pit_time_loss_tables(), &tables));
    }

    #[test]
    fn offline_requires_a_session_packet() {
        let mut info = SessionInfo::default();
        assert!(!info.is_offline());
        info.apply(&PacketSession { network_game: false, ..Default::default() });
        assert!(info.is_offline());
        info.apply(&PacketSession { network_game: true, ..Default::default() });
        assert!(!info.is_offline());
    }
}
