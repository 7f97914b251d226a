//! Fastest-lap holder tracking
//!
//! The holder is updated opportunistically when a car's best lap drops below
//! the holder's, and recomputed with a linear scan when the holder's own best
//! changes, when no holder exists, or when a rescan was flagged by lap data.
//!
//! After every [`FastestLapTracker::update`] the holder's best lap is less than
//! or equal to every other car's best lap, and the holder is unset exactly when
//! no car has a best lap.

/// Index of the car holding the session's fastest lap.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FastestLapTracker {
    holder: Option<usize>,
    needs_rescan: bool,
}

impl FastestLapTracker {
    pub fn holder(&self) -> Option<usize> {
        self.holder
    }

    pub fn needs_rescan(&self) -> bool {
        self.needs_rescan
    }

    /// Request a full rescan on the next update.
    pub fn flag_rescan(&mut self) {
        self.needs_rescan = true;
    }

    /// React to `car`'s best lap having been (re)computed.
    ///
    /// `best_laps` holds the best lap of every valid car slot, indexed by car
    /// index; invalid slots are `None`.
    pub fn update(&mut self, car: usize, best_laps: &[Option<u32>]) {
        let holder = match self.holder {
            Some(holder) if !self.needs_rescan && holder != car => holder,
            _ => {
                self.rescan(best_laps);
                return;
            }
        };

        match (best_laps.get(holder).copied().flatten(), best_laps.get(car).copied().flatten()) {
            (Some(holder_best), Some(candidate)) if candidate < holder_best => {
                self.holder = Some(car);
            }
            (Some(_), _) => {}
            // The holder lost its lap without this tracker being told
            (None, _) => self.rescan(best_laps),
        }
    }

    /// Linear scan for the minimum best lap; the lowest index wins ties.
    pub fn rescan(&mut self, best_laps: &[Option<u32>]) {
        self.needs_rescan = false;
        self.holder = best_laps
            .iter()
            .enumerate()
            .filter_map(|(idx, best)| best.map(|time| (time, idx)))
            .min()
            .map(|(_, idx)| idx);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Null-safe minimum: `None` only when both sides are `None`.
pub fn min_time(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ties_go_to_lowest_index() {
        let mut tracker = FastestLapTracker::default();
        let bests = [None, Some(90_000), Some(85_000), Some(85_000)];
        tracker.update(3, &bests);
        assert_eq!(tracker.holder(), Some(2));
    }

    #[test]
    fn equal_time_does_not_unseat_holder() {
        let mut tracker = FastestLapTracker::default();
        let mut bests = [Some(85_000), None, None];
        tracker.update(0, &bests);
        bests[2] = Some(85_000);
        tracker.update(2, &bests);
        assert_eq!(tracker.holder(), Some(0));
        bests[2] = Some(84_999);
        tracker.update(2, &bests);
        assert_eq!(tracker.holder(), Some(2));
    }

    #[test]
    fn clearing_holder_best_triggers_rescan() {
        let mut tracker = FastestLapTracker::default();
        let mut bests = [Some(80_000), Some(81_000), Some(82_000)];
        tracker.update(0, &bests);
        assert_eq!(tracker.holder(), Some(0));
        bests[0] = None;
        tracker.update(0, &bests);
        assert_eq!(tracker.holder(), Some(1));
        bests = [None, None, None];
        tracker.update(1, &bests);
        assert_eq!(tracker.holder(), None);
    }

    #[test]
    fn flagged_rescan_is_consumed() {
        let mut tracker = FastestLapTracker::default();
        tracker.flag_rescan();
        assert!(tracker.needs_rescan());
        tracker.update(1, &[Some(70_000), Some(60_000)]);
        assert!(!tracker.needs_rescan());
        assert_eq!(tracker.holder(), Some(1));
    }

    #[test]
    fn null_safe_min() {
        assert_eq!(min_time(None, None), None);
        assert_eq!(min_time(Some(3), None), Some(3));
        assert_eq!(min_time(None, Some(4)), Some(4));
        assert_eq!(min_time(Some(9), Some(4)), Some(4));
    }

    proptest! {
        #[test]
        fn prop_holder_is_minimum_after_every_update(
            updates in prop::collection::vec((0usize..22, prop::option::of(60_000u32..120_000)), 1..200)
        ) {
            let mut tracker = FastestLapTracker::default();
            let mut bests = [None; 22];
            for (car, best) in updates {
                bests[car] = best;
                tracker.update(car, &bests);

                match tracker.holder() {
                    Some(holder) => {
                        let holder_best = bests[holder];
                        prop_assert!(holder_best.is_some());
                        for other in bests.iter().flatten() {
                            prop_assert!(holder_best.unwrap() <= *other);
                        }
                    }
                    None => prop_assert!(bests.iter().all(Option::is_none)),
                }
            }
        }
    }
}
