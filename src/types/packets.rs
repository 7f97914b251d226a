//! Decoded packet records
//!
//! These structs are what the decoder collaborator hands to the engine. They
//! are plain immutable data: times are already converted to milliseconds,
//! protocol codes are resolved into the enums in [`super::enums`], and every
//! packet carries its [`PacketHeader`] so it is self-describing with respect
//! to protocol format and session.

use serde::{Deserialize, Serialize};

use super::enums::{
    ActualTyreCompound, DriverStatus, Formula, PitStatus, ResultStatus, SafetyCarStatus,
    SessionType, TelemetrySetting, TrackId, VisualTyreCompound, Weather,
};
use super::event::PacketEvent;

/// Header common to every packet.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketHeader {
    /// Protocol format, i.e. the game year (2023, 2024, 2025)
    pub packet_format: u16,
    pub game_year: u8,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub session_uid: u64,
    /// Session timestamp in seconds
    pub session_time: f32,
    pub frame_identifier: u32,
    pub overall_frame_identifier: u32,
    /// Index of the player's car; 255 when spectating
    pub player_car_index: u8,
    pub secondary_player_car_index: u8,
}

/// One decoded packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    Motion(PacketMotion),
    Session(PacketSession),
    LapData(PacketLapData),
    Event(PacketEvent),
    Participants(PacketParticipants),
    CarSetups(PacketCarSetups),
    CarTelemetry(PacketCarTelemetry),
    CarStatus(PacketCarStatus),
    FinalClassification(PacketFinalClassification),
    CarDamage(PacketCarDamage),
    SessionHistory(PacketSessionHistory),
    TyreSets(PacketTyreSets),
    TimeTrial(PacketTimeTrial),
}

/// Discriminator of [`Packet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketKind {
    Motion,
    Session,
    LapData,
    Event,
    Participants,
    CarSetups,
    CarTelemetry,
    CarStatus,
    FinalClassification,
    CarDamage,
    SessionHistory,
    TyreSets,
    TimeTrial,
}

impl PacketKind {
    pub const ALL: [PacketKind; 13] = [
        PacketKind::Motion,
        PacketKind::Session,
        PacketKind::LapData,
        PacketKind::Event,
        PacketKind::Participants,
        PacketKind::CarSetups,
        PacketKind::CarTelemetry,
        PacketKind::CarStatus,
        PacketKind::FinalClassification,
        PacketKind::CarDamage,
        PacketKind::SessionHistory,
        PacketKind::TyreSets,
        PacketKind::TimeTrial,
    ];

    /// Position of this kind in [`PacketKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Motion(_) => PacketKind::Motion,
            Packet::Session(_) => PacketKind::Session,
            Packet::LapData(_) => PacketKind::LapData,
            Packet::Event(_) => PacketKind::Event,
            Packet::Participants(_) => PacketKind::Participants,
            Packet::CarSetups(_) => PacketKind::CarSetups,
            Packet::CarTelemetry(_) => PacketKind::CarTelemetry,
            Packet::CarStatus(_) => PacketKind::CarStatus,
            Packet::FinalClassification(_) => PacketKind::FinalClassification,
            Packet::CarDamage(_) => PacketKind::CarDamage,
            Packet::SessionHistory(_) => PacketKind::SessionHistory,
            Packet::TyreSets(_) => PacketKind::TyreSets,
            Packet::TimeTrial(_) => PacketKind::TimeTrial,
        }
    }

    pub fn header(&self) -> &PacketHeader {
        match self {
            Packet::Motion(p) => &p.header,
            Packet::Session(p) => &p.header,
            Packet::LapData(p) => &p.header,
            Packet::Event(p) => &p.header,
            Packet::Participants(p) => &p.header,
            Packet::CarSetups(p) => &p.header,
            Packet::CarTelemetry(p) => &p.header,
            Packet::CarStatus(p) => &p.header,
            Packet::FinalClassification(p) => &p.header,
            Packet::CarDamage(p) => &p.header,
            Packet::SessionHistory(p) => &p.header,
            Packet::TyreSets(p) => &p.header,
            Packet::TimeTrial(p) => &p.header,
        }
    }
}

// Motion

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarMotionData {
    pub world_position_x: f32,
    pub world_position_y: f32,
    pub world_position_z: f32,
    pub g_force_lateral: f32,
    pub g_force_longitudinal: f32,
    pub g_force_vertical: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketMotion {
    pub header: PacketHeader,
    pub car_motion_data: Vec<CarMotionData>,
}

// Session

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecastSample {
    pub session_type: SessionType,
    /// Minutes from now
    pub time_offset: u8,
    pub weather: Weather,
    pub track_temperature: i8,
    pub track_temperature_change: i8,
    pub air_temperature: i8,
    pub air_temperature_change: i8,
    pub rain_percentage: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketSession {
    pub header: PacketHeader,
    pub weather: Weather,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    /// Track length in metres
    pub track_length: u16,
    pub session_type: SessionType,
    pub track_id: TrackId,
    pub formula: Formula,
    /// Seconds
    pub session_time_left: u16,
    /// Seconds; zero while the game sits in menus between sessions
    pub session_duration: u16,
    /// km/h
    pub pit_speed_limit: u8,
    pub game_paused: bool,
    pub is_spectating: bool,
    pub spectator_car_index: u8,
    pub safety_car_status: SafetyCarStatus,
    pub network_game: bool,
    pub weather_forecast_samples: Vec<WeatherForecastSample>,
    pub forecast_accuracy: u8,
    pub pit_stop_window_ideal_lap: u8,
    pub pit_stop_window_latest_lap: u8,
    pub pit_stop_rejoin_position: u8,
    pub num_safety_car_periods: u8,
    pub num_virtual_safety_car_periods: u8,
    pub num_red_flag_periods: u8,
    pub sector2_lap_distance_start: f32,
    pub sector3_lap_distance_start: f32,
}

// Lap data

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapData {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub sector1_time_ms: u32,
    pub sector2_time_ms: u32,
    pub delta_to_car_in_front_ms: u32,
    pub delta_to_race_leader_ms: u32,
    /// Metres along the current lap; negative before crossing the line
    pub lap_distance: f32,
    pub total_distance: f32,
    pub safety_car_delta: f32,
    pub car_position: u8,
    pub current_lap_num: u8,
    pub pit_status: PitStatus,
    pub num_pit_stops: u8,
    /// Zero-based sector
    pub sector: u8,
    pub current_lap_invalid: bool,
    /// Accumulated time penalties in seconds
    pub penalties: u8,
    pub total_warnings: u8,
    pub corner_cutting_warnings: u8,
    pub num_unserved_drive_through_pens: u8,
    pub num_unserved_stop_go_pens: u8,
    pub grid_position: u8,
    pub driver_status: DriverStatus,
    pub result_status: ResultStatus,
    pub pit_lane_timer_active: bool,
    pub pit_lane_time_in_lane_ms: u16,
    pub pit_stop_timer_ms: u16,
    pub pit_stop_should_serve_pen: bool,
    /// km/h
    pub speed_trap_fastest_speed: f32,
    /// 255 when not set
    pub speed_trap_fastest_lap: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketLapData {
    pub header: PacketHeader,
    pub car_lap_data: Vec<LapData>,
    pub time_trial_pb_car_idx: u8,
    pub time_trial_rival_car_idx: u8,
}

// Participants

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantData {
    pub ai_controlled: bool,
    pub driver_id: u8,
    pub network_id: u8,
    pub team_id: u8,
    /// Team display name, resolved by the decoder
    pub team: String,
    pub my_team: bool,
    pub race_number: u8,
    pub nationality: u8,
    pub name: String,
    pub your_telemetry: TelemetrySetting,
    pub show_online_names: bool,
    pub platform: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketParticipants {
    pub header: PacketHeader,
    pub num_active_cars: u8,
    pub participants: Vec<ParticipantData>,
}

// Car setups

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSetupData {
    pub front_wing: u8,
    pub rear_wing: u8,
    pub on_throttle: u8,
    pub off_throttle: u8,
    pub front_camber: f32,
    pub rear_camber: f32,
    pub front_toe: f32,
    pub rear_toe: f32,
    pub front_suspension: u8,
    pub rear_suspension: u8,
    pub front_anti_roll_bar: u8,
    pub rear_anti_roll_bar: u8,
    pub front_suspension_height: u8,
    pub rear_suspension_height: u8,
    pub brake_pressure: u8,
    pub brake_bias: u8,
    pub engine_braking: u8,
    pub rear_left_tyre_pressure: f32,
    pub rear_right_tyre_pressure: f32,
    pub front_left_tyre_pressure: f32,
    pub front_right_tyre_pressure: f32,
    pub ballast: u8,
    pub fuel_load: f32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketCarSetups {
    pub header: PacketHeader,
    pub car_setups: Vec<CarSetupData>,
    pub next_front_wing_value: f32,
}

// Car telemetry

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTelemetryData {
    /// km/h
    pub speed: u16,
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub clutch: u8,
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: bool,
    pub rev_lights_percent: u8,
    /// RL, RR, FL, FR
    pub brakes_temperature: [u16; 4],
    pub tyres_surface_temperature: [u8; 4],
    pub tyres_inner_temperature: [u8; 4],
    pub engine_temperature: u16,
    pub tyres_pressure: [f32; 4],
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketCarTelemetry {
    pub header: PacketHeader,
    pub car_telemetry_data: Vec<CarTelemetryData>,
}

// Car status

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarStatusData {
    pub traction_control: u8,
    pub anti_lock_brakes: bool,
    pub fuel_mix: u8,
    pub front_brake_bias: u8,
    pub pit_limiter_status: bool,
    pub fuel_in_tank: f32,
    pub fuel_capacity: f32,
    pub fuel_remaining_laps: f32,
    pub max_rpm: u16,
    pub idle_rpm: u16,
    pub max_gears: u8,
    pub drs_allowed: bool,
    pub drs_activation_distance: u16,
    pub actual_tyre_compound: ActualTyreCompound,
    pub visual_tyre_compound: VisualTyreCompound,
    pub tyres_age_laps: u8,
    /// -1 invalid, 0 none, 1 green, 2 blue, 3 yellow
    pub vehicle_fia_flags: i8,
    pub engine_power_ice: f32,
    pub engine_power_mguk: f32,
    /// Joules
    pub ers_store_energy: f32,
    pub ers_deploy_mode: u8,
    pub ers_harvested_this_lap_mguk: f32,
    pub ers_harvested_this_lap_mguh: f32,
    pub ers_deployed_this_lap: f32,
    pub network_paused: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketCarStatus {
    pub header: PacketHeader,
    pub car_status_data: Vec<CarStatusData>,
}

// Final classification

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalClassificationData {
    /// Zero when the car has no classified position
    pub position: u8,
    pub num_laps: u8,
    pub grid_position: u8,
    pub points: u8,
    pub num_pit_stops: u8,
    pub result_status: ResultStatus,
    pub best_lap_time_ms: u32,
    /// Seconds, without penalties
    pub total_race_time: f64,
    /// Seconds
    pub penalties_time: u8,
    pub num_penalties: u8,
    pub num_tyre_stints: u8,
    pub tyre_stints_actual: Vec<ActualTyreCompound>,
    pub tyre_stints_visual: Vec<VisualTyreCompound>,
    pub tyre_stints_end_laps: Vec<u8>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketFinalClassification {
    pub header: PacketHeader,
    pub num_cars: u8,
    pub classification_data: Vec<FinalClassificationData>,
}

// Car damage

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDamageData {
    /// Percent, RL, RR, FL, FR
    pub tyres_wear: [f32; 4],
    pub tyres_damage: [u8; 4],
    pub brakes_damage: [u8; 4],
    pub tyre_blisters: [u8; 4],
    pub front_left_wing_damage: u8,
    pub front_right_wing_damage: u8,
    pub rear_wing_damage: u8,
    pub floor_damage: u8,
    pub diffuser_damage: u8,
    pub sidepod_damage: u8,
    pub drs_fault: bool,
    pub ers_fault: bool,
    pub gear_box_damage: u8,
    pub engine_damage: u8,
    pub engine_blown: bool,
    pub engine_seized: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketCarDamage {
    pub header: PacketHeader,
    pub car_damage_data: Vec<CarDamageData>,
}

// Session history

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapHistoryData {
    pub lap_time_ms: u32,
    pub sector1_time_ms: u32,
    pub sector2_time_ms: u32,
    pub sector3_time_ms: u32,
    /// bit 0 lap, bit 1..3 sectors 1..3
    pub lap_valid_bit_flags: u8,
}

impl LapHistoryData {
    pub fn is_lap_valid(&self) -> bool {
        self.lap_valid_bit_flags & 0x01 != 0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreStintHistoryData {
    /// 255 for the current stint
    pub end_lap: u8,
    pub tyre_actual_compound: ActualTyreCompound,
    pub tyre_visual_compound: VisualTyreCompound,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketSessionHistory {
    pub header: PacketHeader,
    pub car_idx: u8,
    pub num_laps: u8,
    pub num_tyre_stints: u8,
    /// 1-based, zero when no best lap exists
    pub best_lap_time_lap_num: u8,
    pub best_sector1_lap_num: u8,
    pub best_sector2_lap_num: u8,
    pub best_sector3_lap_num: u8,
    pub lap_history_data: Vec<LapHistoryData>,
    pub tyre_stints_history_data: Vec<TyreStintHistoryData>,
}

// Tyre sets

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreSetData {
    pub actual_tyre_compound: ActualTyreCompound,
    pub visual_tyre_compound: VisualTyreCompound,
    /// Percent
    pub wear: u8,
    pub available: bool,
    pub recommended_session: u8,
    pub life_span: u8,
    pub usable_life: u8,
    /// Lap delta in milliseconds compared to the fitted set
    pub lap_delta_time: i16,
    pub fitted: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketTyreSets {
    pub header: PacketHeader,
    pub car_idx: u8,
    pub tyre_set_data: Vec<TyreSetData>,
    pub fitted_idx: u8,
}

// Time trial

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTrialDataSet {
    pub car_idx: u8,
    pub team_id: u8,
    pub lap_time_ms: u32,
    pub sector1_time_ms: u32,
    pub sector2_time_ms: u32,
    pub sector3_time_ms: u32,
    pub traction_control: u8,
    pub gearbox_assist: u8,
    pub anti_lock_brakes: bool,
    pub equal_car_performance: bool,
    pub custom_setup: bool,
    pub valid: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketTimeTrial {
    pub header: PacketHeader,
    pub player_session_best: TimeTrialDataSet,
    pub personal_best: TimeTrialDataSet,
    pub rival: TimeTrialDataSet,
}
