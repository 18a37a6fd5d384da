use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// PairKey: canonical unordered pair of people
// ---------------------------------------------------------------------------

/// An unordered pair of person identifiers. The two endpoints are stored in
/// lexicographic order so `(a, b)` and `(b, a)` are the same key, and a pair
/// can never contain the same person twice.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey(String, String);

impl PairKey {
    /// Build the canonical key for two people. Returns `None` for a
    /// self-pair, since a person cannot co-occur with themself.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Option<Self> {
        let a = a.into();
        let b = b.into();
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

// ---------------------------------------------------------------------------
// RelationGraph: undirected, weighted co-occurrence graph
// ---------------------------------------------------------------------------

/// Undirected weighted graph of who appeared with whom.
///
/// Nodes are people observed at or before the cutoff; the weight of an edge
/// is the number of photos the two endpoints share. Ordered maps keep
/// iteration stable regardless of insertion order.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    nodes: BTreeSet<String>,
    edges: BTreeMap<PairKey, u64>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a person as observed, even if they share no photo yet.
    pub fn add_node(&mut self, person: impl Into<String>) {
        self.nodes.insert(person.into());
    }

    /// Increment the co-occurrence weight between two people by `by`.
    /// A self-pair is ignored. Both endpoints become nodes.
    pub fn add_cooccurrence(&mut self, a: &str, b: &str, by: u64) {
        let Some(key) = PairKey::new(a, b) else {
            return;
        };
        self.nodes.insert(a.to_string());
        self.nodes.insert(b.to_string());
        *self.edges.entry(key).or_insert(0) += by;
    }

    /// Weight of the edge between two people, 0 if they never co-occurred.
    pub fn weight(&self, a: &str, b: &str) -> u64 {
        PairKey::new(a, b)
            .and_then(|key| self.edges.get(&key).copied())
            .unwrap_or(0)
    }

    pub fn contains_node(&self, person: &str) -> bool {
        self.nodes.contains(person)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// People in the graph, in lexicographic order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Edges with weights, in canonical pair order.
    pub fn edges(&self) -> impl Iterator<Item = (&PairKey, u64)> {
        self.edges.iter().map(|(key, weight)| (key, *weight))
    }

    /// Sum of all edge weights. Each shared photo of each pair counts once.
    pub fn total_weight(&self) -> u64 {
        self.edges.values().sum()
    }
}

// ---------------------------------------------------------------------------
// DirectedGraph: manito assignments revealed so far
// ---------------------------------------------------------------------------

/// A directed edge in the manito graph, carrying the row's description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub from: String,
    pub to: String,
    pub description: String,
}

/// Directed graph of revealed manito assignments.
///
/// Insertion order of edges is preserved: it is the reveal order, and the
/// dashboard replays it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectedGraph {
    nodes: BTreeSet<String>,
    edges: Vec<DirectedEdge>,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: &str, to: &str, description: &str) {
        self.nodes.insert(from.to_string());
        self.nodes.insert(to.to_string());
        self.edges.push(DirectedEdge {
            from: from.to_string(),
            to: to.to_string(),
            description: description.to_string(),
        });
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Description attached to a node's outgoing assignment, if revealed.
    pub fn node_description(&self, person: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|edge| edge.from == person)
            .map(|edge| edge.description.as_str())
    }
}
