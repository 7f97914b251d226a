//! Core types for decoded telemetry packets.
//!
//! This module provides the data structures the decoder collaborator produces
//! and the engine consumes. Nothing in here performs I/O or byte parsing; the
//! binary layout belongs to the decoder.
//!
//! ## Architecture
//!
//! - [`InboundFrame`] pairs the raw datagram (kept for forwarding) with its decoded [`Packet`]
//! - [`Packet`] is a closed enum with one variant per packet type, discriminated by [`PacketKind`]
//! - [`EventDetails`] is a closed enum with one variant per event code, discriminated by [`EventKind`]
//! - [`ButtonFlags`] interprets the button-status mask, including the twelve UDP action buttons
//!
//! ## Usage Example
//!
//! ```rust
//! use paddock::types::{InboundFrame, Packet, PacketKind, PacketSession, SessionType};
//!
//! let session = PacketSession {
//!     session_type: SessionType::Race,
//!     session_duration: 3600,
//!     ..Default::default()
//! };
//! let frame = InboundFrame::decoded(Packet::Session(session));
//! assert_eq!(frame.packet.kind(), PacketKind::Session);
//! ```

mod button;
mod enums;
mod event;
mod frame;
mod packets;

pub use button::{ButtonFlags, flags as button_flags, udp_action_mask};
pub use enums::{
    ActualTyreCompound, DriverStatus, Formula, MAX_CARS, PitStatus, ResultStatus,
    SafetyCarStatus, SessionCategory, SessionType, TelemetrySetting, TrackId, TyreCategory,
    VehicleClass, VisualTyreCompound, Weather,
};
pub use event::{EventDetails, EventKind, PacketEvent};
pub use frame::InboundFrame;
pub use packets::{
    CarDamageData, CarMotionData, CarSetupData, CarStatusData, CarTelemetryData,
    FinalClassificationData, LapData, LapHistoryData, Packet, PacketCarDamage, PacketCarSetups,
    PacketCarStatus, PacketCarTelemetry, PacketFinalClassification, PacketHeader, PacketKind,
    PacketLapData, PacketMotion, PacketParticipants, PacketSession, PacketSessionHistory,
    PacketTimeTrial, PacketTyreSets, ParticipantData, TimeTrialDataSet, TyreSetData,
    TyreStintHistoryData, WeatherForecastSample,
};
