//! Read-only views over the session state
//!
//! Each builder turns the store into a serializable document. Builders never
//! mutate the store and degrade to defaults (or `None`) when upstream data has
//! not arrived yet.
//!
//! - [`RaceTableDocument`]: per-car rows plus session fields, or a time-trial view
//! - [`StreamOverlay`]: the focused car only
//! - [`DriverInfoView`]: everything known about one driver
//! - [`PostRaceDump`]: the final classification document written to disk

mod driver_info;
mod overlay;
mod post_race;
mod race_table;

pub use driver_info::DriverInfoView;
pub use overlay::StreamOverlay;
pub use post_race::{
    ClassificationRow, DebugInfo, DriverStints, DumpSessionInfo, LapPosition, OvertakesSection,
    PositionHistory, PostRaceDump, RecordHolder, Records, SpeedTrapRecord, StintRecord, StintV1,
    StintV2, TyreStintHistory, dump_file_name,
};
pub use race_table::{RaceTable, RaceTableDocument, RaceTableRow, SessionFields, TimeTrialTable};

/// Usable ERS store in joules.
const ERS_MAX_ENERGY: f32 = 4_000_000.0;

fn ers_percent(store: Option<f32>) -> Option<f32> {
    store.map(|joules| (joules / ERS_MAX_ENERGY * 100.0).clamp(0.0, 100.0))
}

/// Formatted lap time, or `---` when unknown.
fn lap_time_text(ms: Option<u32>) -> String {
    ms.map(crate::format::lap_time).unwrap_or_else(|| "---".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ers_percent_is_clamped() {
        assert_eq!(ers_percent(Some(2_000_000.0)), Some(50.0));
        assert_eq!(ers_percent(Some(9_000_000.0)), Some(100.0));
        assert_eq!(ers_percent(None), None);
    }

    #[test]
    fn unknown_lap_time_placeholder() {
        assert_eq!(lap_time_text(None), "---");
        assert_eq!(lap_time_text(Some(61_001)), "1:01.001");
    }
}
