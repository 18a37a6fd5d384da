use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::record::InteractionRecord;
use crate::model::series::MeetingSeries;

// ---------------------------------------------------------------------------
// Cumulative relationship counter
// ---------------------------------------------------------------------------

/// Compute the cumulative meeting series for `focal` over all records.
///
/// Records are grouped by timestamp. At each timestamp where the focal person
/// appears, every other person present gets credited with the number of the
/// focal person's photos at that timestamp that the two share. Credits are
/// accumulated chronologically into running totals, which are carried forward
/// across timestamps with no new interaction.
///
/// A focal person who never appears in the data yields an empty series.
pub fn cumulative_series(records: &[InteractionRecord], focal: &str) -> MeetingSeries {
    if !records.iter().any(|r| r.person == focal) {
        return MeetingSeries::empty(focal);
    }

    let mut by_timestamp: BTreeMap<_, Vec<&InteractionRecord>> = BTreeMap::new();
    for record in records {
        by_timestamp.entry(record.timestamp).or_default().push(record);
    }

    let timestamps: Vec<_> = by_timestamp.keys().copied().collect();
    let mut running: BTreeMap<String, u64> = BTreeMap::new();
    let mut counts: BTreeMap<String, Vec<u64>> = BTreeMap::new();

    for (index, group) in by_timestamp.values().enumerate() {
        let focal_photos: Vec<&str> = group
            .iter()
            .filter(|r| r.person == focal)
            .map(|r| r.filename.as_str())
            .collect();

        if !focal_photos.is_empty() {
            let others: BTreeSet<&str> = group
                .iter()
                .map(|r| r.person.as_str())
                .filter(|p| *p != focal)
                .collect();

            for other in others {
                let other_photos: HashSet<&str> = group
                    .iter()
                    .filter(|r| r.person == other)
                    .map(|r| r.filename.as_str())
                    .collect();
                let shared = focal_photos
                    .iter()
                    .filter(|photo| other_photos.contains(**photo))
                    .count() as u64;
                if shared == 0 {
                    continue;
                }

                *running.entry(other.to_string()).or_insert(0) += shared;
                // Backfill zeros for a person first seen mid-series.
                counts
                    .entry(other.to_string())
                    .or_insert_with(|| vec![0; index]);
            }
        }

        for (person, row) in counts.iter_mut() {
            row.push(running.get(person).copied().unwrap_or(0));
        }
    }

    MeetingSeries {
        focal: focal.to_string(),
        timestamps,
        counts,
    }
}

// ---------------------------------------------------------------------------
// Top-N ranking
// ---------------------------------------------------------------------------

/// One entry of a top-N ranking at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPerson {
    pub person: String,
    pub count: u64,
}

/// The top `n` people by cumulative count at the i-th timestamp of a series.
///
/// Ties are broken deterministically: count descending, then identifier
/// ascending. People with a zero count at that point are not ranked.
pub fn top_n(series: &MeetingSeries, index: usize, n: usize) -> Vec<RankedPerson> {
    let mut ranked: Vec<RankedPerson> = series
        .frame(index)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(person, count)| RankedPerson { person, count })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.person.cmp(&b.person)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 14, 10, minute, 0).unwrap()
    }

    fn record(person: &str, photo: &str, minute: u32) -> InteractionRecord {
        InteractionRecord::new(person, photo, ts(minute))
    }

    fn two_photo_records() -> Vec<InteractionRecord> {
        vec![
            record("alice", "photo1", 1),
            record("bob", "photo1", 1),
            record("alice", "photo2", 2),
            record("carol", "photo2", 2),
        ]
    }

    #[test]
    fn worked_example_series() {
        let series = cumulative_series(&two_photo_records(), "alice");

        // bob meets alice at t1 and stays at 1; carol joins at t2.
        assert_eq!(series.timestamps, vec![ts(1), ts(2)]);
        assert_eq!(series.counts["bob"], vec![1, 1]);
        assert_eq!(series.counts["carol"], vec![0, 1]);
    }

    #[test]
    fn unknown_focal_person_yields_empty_series() {
        let series = cumulative_series(&two_photo_records(), "dave");
        assert!(series.is_empty());
        assert!(series.timestamps.is_empty());
    }

    #[test]
    fn counts_are_non_decreasing() {
        let records = vec![
            record("alice", "p1", 1),
            record("bob", "p1", 1),
            record("alice", "p2", 2),
            record("bob", "p2", 2),
            record("alice", "p3", 3),
            record("carol", "p3", 3),
            record("alice", "p4", 4),
            record("bob", "p4", 4),
        ];

        let series = cumulative_series(&records, "alice");
        for row in series.counts.values() {
            for pair in row.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
        }
        assert_eq!(series.counts["bob"], vec![1, 2, 2, 3]);
        assert_eq!(series.counts["carol"], vec![0, 0, 1, 1]);
    }

    #[test]
    fn same_timestamp_different_photos_counted_per_shared_photo() {
        // Two photos at the same timestamp; bob shares both with alice,
        // carol shares only one.
        let records = vec![
            record("alice", "p1", 1),
            record("bob", "p1", 1),
            record("alice", "p2", 1),
            record("bob", "p2", 1),
            record("carol", "p2", 1),
        ];

        let series = cumulative_series(&records, "alice");
        assert_eq!(series.counts["bob"], vec![2]);
        assert_eq!(series.counts["carol"], vec![1]);
    }

    #[test]
    fn co_present_timestamp_without_shared_photo_adds_nothing() {
        // alice and bob both appear at t1 but in different photos.
        let records = vec![
            record("alice", "p1", 1),
            record("bob", "p2", 1),
            record("alice", "p3", 2),
            record("bob", "p3", 2),
        ];

        let series = cumulative_series(&records, "alice");
        assert_eq!(series.counts["bob"], vec![0, 1]);
    }

    #[test]
    fn top_n_breaks_ties_by_identifier() {
        let records = vec![
            record("alice", "p1", 1),
            record("zoe", "p1", 1),
            record("alice", "p2", 2),
            record("bob", "p2", 2),
        ];

        let series = cumulative_series(&records, "alice");
        let ranked = top_n(&series, 1, 3);

        // bob and zoe both sit at 1; identifier order decides.
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].person, "bob");
        assert_eq!(ranked[1].person, "zoe");
    }

    #[test]
    fn top_n_truncates_and_skips_zero_counts() {
        let records = vec![
            record("alice", "p1", 1),
            record("bob", "p1", 1),
            record("alice", "p2", 2),
            record("bob", "p2", 2),
            record("alice", "p3", 3),
            record("carol", "p3", 3),
        ];

        let series = cumulative_series(&records, "alice");
        // At the first timestamp only bob has met alice.
        let ranked = top_n(&series, 0, 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].person, "bob");

        let ranked = top_n(&series, 2, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0], RankedPerson { person: "bob".to_string(), count: 2 });
    }
}
