use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::model::graph::RelationGraph;
use crate::model::record::InteractionRecord;

// ---------------------------------------------------------------------------
// Co-occurrence graph builder
// ---------------------------------------------------------------------------

/// Build the co-occurrence graph over all records at or before `cutoff`.
///
/// Records are partitioned by photo; every unordered pair of distinct people
/// in a photo adds one to that pair's edge weight. The accumulation is
/// symmetric, so iteration order never changes the result. A photo with a
/// single tagged person contributes a node but no edge, and a cutoff earlier
/// than all timestamps yields an empty graph.
pub fn build_graph(records: &[InteractionRecord], cutoff: DateTime<Utc>) -> RelationGraph {
    let mut by_photo: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.timestamp <= cutoff) {
        by_photo
            .entry(record.filename.as_str())
            .or_default()
            .push(record.person.as_str());
    }

    let mut graph = RelationGraph::new();
    for people in by_photo.values() {
        for person in people {
            graph.add_node(*person);
        }
        for i in 0..people.len() {
            for j in (i + 1)..people.len() {
                graph.add_cooccurrence(people[i], people[j], 1);
            }
        }
    }
    graph
}

/// Build the graph over the entire dataset, ignoring any cutoff.
/// This is what the layout cache is computed from.
pub fn build_full_graph(records: &[InteractionRecord]) -> RelationGraph {
    match records.iter().map(|r| r.timestamp).max() {
        Some(latest) => build_graph(records, latest),
        None => RelationGraph::new(),
    }
}
