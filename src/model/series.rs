use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// MeetingSeries: cumulative meeting counts for one focal person
// ---------------------------------------------------------------------------

/// Cumulative meeting counts between a focal person and everyone else,
/// sampled at every timestamp present in the dataset.
///
/// For a fixed other person the counts are non-decreasing over time: once two
/// people have shared a photo, that meeting is never un-counted. Timestamps
/// with no new interaction carry the previous total forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSeries {
    /// The person all counts are relative to.
    pub focal: String,
    /// Every timestamp in the dataset, ascending and deduplicated.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Per other-person cumulative counts, one value per timestamp.
    /// `counts[p][i]` is the running total for `p` at `timestamps[i]`.
    pub counts: BTreeMap<String, Vec<u64>>,
}

impl MeetingSeries {
    /// An empty series for a focal person with no appearances.
    pub fn empty(focal: impl Into<String>) -> Self {
        Self {
            focal: focal.into(),
            timestamps: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of sampled timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Cumulative count for `other` at the i-th timestamp.
    pub fn count_at(&self, other: &str, index: usize) -> Option<u64> {
        self.counts.get(other).and_then(|row| row.get(index)).copied()
    }

    /// Final cumulative count for `other`, 0 if never met.
    pub fn final_count(&self, other: &str) -> u64 {
        self.counts
            .get(other)
            .and_then(|row| row.last())
            .copied()
            .unwrap_or(0)
    }

    /// The state of the race at one timestamp: `(other, running total)` for
    /// every tracked person, in identifier order.
    pub fn frame(&self, index: usize) -> Vec<(String, u64)> {
        self.counts
            .iter()
            .filter_map(|(person, row)| row.get(index).map(|count| (person.clone(), *count)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 14, 10, minute, 0).unwrap()
    }

    #[test]
    fn empty_series_reports_zero() {
        let series = MeetingSeries::empty("alice");
        assert!(series.is_empty());
        assert_eq!(series.final_count("bob"), 0);
        assert!(series.frame(0).is_empty());
    }

    #[test]
    fn frame_reads_one_column() {
        let mut counts = BTreeMap::new();
        counts.insert("bob".to_string(), vec![1, 1, 2]);
        counts.insert("carol".to_string(), vec![0, 1, 1]);
        let series = MeetingSeries {
            focal: "alice".to_string(),
            timestamps: vec![ts(0), ts(1), ts(2)],
            counts,
        };

        assert_eq!(
            series.frame(1),
            vec![("bob".to_string(), 1), ("carol".to_string(), 1)]
        );
        assert_eq!(series.count_at("bob", 2), Some(2));
        assert_eq!(series.final_count("carol"), 1);
    }
}
