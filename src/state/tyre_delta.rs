//! Tyre-delta advisory
//!
//! Compares the fitted tyre category against the two alternatives held in the
//! player's tyre-set inventory. The game reports each set's lap delta relative
//! to the fitted set, so the advisory is a lookup rather than a computation.

use serde::{Deserialize, Serialize};

use crate::types::{ActualTyreCompound, TyreCategory, TyreSetData};

/// Lap-time hint for one alternative tyre category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreDeltaMessage {
    pub tyre_type: TyreCategory,
    pub delta_ms: i16,
    pub message: String,
}

impl TyreDeltaMessage {
    fn new(tyre_type: TyreCategory, delta_ms: i16) -> Self {
        let message = format!(
            "{} tyre delta: {}",
            tyre_type.label(),
            crate::format::delta(i32::from(delta_ms))
        );
        Self { tyre_type, delta_ms, message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanDirection {
    Forward,
    Backward,
}

/// Find a representative set of `category`, preferring available sets.
///
/// Scans every set the game reports (20 in current games), not only the
/// first 8 fitted-set slots: wet-weather sets sit past slot 8.
fn find_set(
    sets: &[TyreSetData],
    category: TyreCategory,
    direction: ScanDirection,
) -> Option<&TyreSetData> {
    let matches = |set: &&TyreSetData| set.actual_tyre_compound.category() == Some(category);
    let pick = |available_only: bool| {
        let wanted = |set: &&TyreSetData| matches(set) && (!available_only || set.available);
        match direction {
            ScanDirection::Forward => sets.iter().find(wanted),
            ScanDirection::Backward => sets.iter().rev().find(wanted),
        }
    };
    pick(true).or_else(|| pick(false))
}

/// Advisory messages for the categories other than the fitted one.
///
/// A category with no set in the inventory yields no message. An unknown
/// fitted compound yields nothing.
pub fn compute(fitted: ActualTyreCompound, sets: &[TyreSetData]) -> Vec<TyreDeltaMessage> {
    let Some(fitted_category) = fitted.category() else {
        return Vec::new();
    };

    let mut others = TyreCategory::ALL.into_iter().filter(|c| *c != fitted_category);
    let scans = [
        others.next().map(|c| (c, ScanDirection::Forward)),
        others.next().map(|c| (c, ScanDirection::Backward)),
    ];

    scans
        .into_iter()
        .flatten()
        .filter_map(|(category, direction)| {
            let set = find_set(sets, category, direction);
            if set.is_none() {
                tracing::debug!(category = category.label(), "No tyre set for advisory");
            }
            set.map(|set| TyreDeltaMessage::new(category, set.lap_delta_time))
        })
        .collect()
}
