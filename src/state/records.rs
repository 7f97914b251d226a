//! Pairwise event records and user bookmarks
//!
//! Collision and overtake records are captured once, at detection time, and
//! never mutated afterwards. Histories are append-only for the lifetime of a
//! session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One party of a pairwise event, as known when the event was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParty {
    pub name: String,
    pub lap: u8,
    pub index: usize,
}

/// Contact between two cars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionRecord {
    pub driver_1: EventParty,
    pub driver_2: EventParty,
}

impl CollisionRecord {
    pub fn involves(&self, index: usize) -> bool {
        self.driver_1.index == index || self.driver_2.index == index
    }
}

/// One car passing another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertakeRecord {
    pub overtaking: EventParty,
    pub overtaken: EventParty,
}

/// Count of overtakes attributed to one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverCount {
    pub name: String,
    pub count: usize,
}

/// Two drivers who swapped positions with each other most often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rivalry {
    pub driver_1: String,
    pub driver_2: String,
    pub count: usize,
}

/// Aggregate view over the overtake history.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertakeSummary {
    pub total: usize,
    pub most_overtakes: Vec<DriverCount>,
    pub most_overtaken: Vec<DriverCount>,
    pub most_heated_rivalries: Vec<Rivalry>,
}

/// Overtakes made and suffered by one driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertakeStatus {
    pub overtakes_made: usize,
    pub times_overtaken: usize,
}

/// Ordered, append-only overtake log.
#[derive(Debug, Default, Clone)]
pub struct OvertakesHistory {
    records: Vec<OvertakeRecord>,
}

impl OvertakesHistory {
    pub fn push(&mut self, record: OvertakeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[OvertakeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in which `name` took part, in detection order.
    pub fn involving<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OvertakeRecord> {
        self.records.iter().filter(move |r| r.overtaking.name == name || r.overtaken.name == name)
    }

    pub fn status(&self, name: &str) -> OvertakeStatus {
        self.involving(name).fold(OvertakeStatus::default(), |mut status, record| {
            if record.overtaking.name == name {
                status.overtakes_made += 1;
            } else {
                status.times_overtaken += 1;
            }
            status
        })
    }

    pub fn summary(&self) -> OvertakeSummary {
        let mut made: BTreeMap<&str, usize> = BTreeMap::new();
        let mut suffered: BTreeMap<&str, usize> = BTreeMap::new();
        let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();

        for record in &self.records {
            let a = record.overtaking.name.as_str();
            let b = record.overtaken.name.as_str();
            *made.entry(a).or_default() += 1;
            *suffered.entry(b).or_default() += 1;
            let key = if a <= b { (a, b) } else { (b, a) };
            *pairs.entry(key).or_default() += 1;
        }

        let leaders = |counts: &BTreeMap<&str, usize>| -> Vec<DriverCount> {
            let max = counts.values().copied().max().unwrap_or(0);
            counts
                .iter()
                .filter(|(_, count)| **count == max && max > 0)
                .map(|(name, count)| DriverCount { name: name.to_string(), count: *count })
                .collect()
        };

        let max_pair = pairs.values().copied().max().unwrap_or(0);
        let most_heated_rivalries = pairs
            .iter()
            .filter(|(_, count)| **count == max_pair && max_pair > 0)
            .map(|((a, b), count)| Rivalry {
                driver_1: a.to_string(),
                driver_2: b.to_string(),
                count: *count,
            })
            .collect();

        OvertakeSummary {
            total: self.records.len(),
            most_overtakes: leaders(&made),
            most_overtaken: leaders(&suffered),
            most_heated_rivalries,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// User-triggered bookmark of a moment in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMarkerEntry {
    pub track: String,
    pub event_type: String,
    pub lap: u8,
    /// 1-based
    pub sector: u8,
    pub curr_lap_time: String,
    pub curr_lap_percent: String,
}

/// Ordered, append-only marker log.
#[derive(Debug, Default, Clone)]
pub struct CustomMarkersHistory {
    entries: Vec<CustomMarkerEntry>,
}

impl CustomMarkersHistory {
    pub fn push(&mut self, entry: CustomMarkerEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CustomMarkerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(name: &str, index: usize) -> EventParty {
        EventParty { name: name.to_string(), lap: 3, index }
    }

    fn overtake(a: &str, b: &str) -> OvertakeRecord {
        OvertakeRecord { overtaking: party(a, 0), overtaken: party(b, 1) }
    }

    #[test]
    fn summary_reports_leaders_and_rivalries() {
        let mut history = OvertakesHistory::default();
        history.push(overtake("NORRIS", "PIASTRI"));
        history.push(overtake("PIASTRI", "NORRIS"));
        history.push(overtake("NORRIS", "RUSSELL"));

        let summary = history.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.most_overtakes, vec![DriverCount { name: "NORRIS".into(), count: 2 }]);
        assert_eq!(summary.most_overtaken.len(), 3);
        assert_eq!(
            summary.most_heated_rivalries,
            vec![Rivalry { driver_1: "NORRIS".into(), driver_2: "PIASTRI".into(), count: 2 }]
        );
    }

    #[test]
    fn empty_history_has_empty_summary() {
        let summary = OvertakesHistory::default().summary();
        assert_eq!(summary, OvertakeSummary::default());
    }

    #[test]
    fn status_counts_both_directions() {
        let mut history = OvertakesHistory::default();
        history.push(overtake("ALONSO", "STROLL"));
        history.push(overtake("HAMILTON", "ALONSO"));
        history.push(overtake("ALONSO", "OCON"));

        let status = history.status("ALONSO");
        assert_eq!(status, OvertakeStatus { overtakes_made: 2, times_overtaken: 1 });
        assert_eq!(history.involving("STROLL").count(), 1);
    }

    #[test]
    fn collision_involvement() {
        let record = CollisionRecord { driver_1: party("A", 2), driver_2: party("B", 7) };
        assert!(record.involves(2));
        assert!(record.involves(7));
        assert!(!record.involves(3));
    }
}
