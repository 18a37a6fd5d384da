use crate::model::graph::DirectedGraph;
use crate::model::record::ManitoRecord;

// ---------------------------------------------------------------------------
// Manito reveal: directed assignments shown up to a sequence index
// ---------------------------------------------------------------------------

/// Build the directed graph of the first `upto` manito assignments.
///
/// `upto` counts revealed rows: 0 shows nothing, `records.len()` shows the
/// whole table, and anything larger is clamped. Edges keep the reveal order.
pub fn revealed_graph(records: &[ManitoRecord], upto: usize) -> DirectedGraph {
    let upto = upto.min(records.len());
    let mut graph = DirectedGraph::new();
    for record in &records[..upto] {
        graph.add_edge(&record.from, &record.to, &record.description);
    }
    graph
}
