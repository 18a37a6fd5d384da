use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::graph::RelationGraph;

// ---------------------------------------------------------------------------
// Spring layout: seeded Fruchterman-Reingold over the full graph
// ---------------------------------------------------------------------------

/// A 2D position in the [-1, 1] square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Node positions for a graph, computed once and reused across cutoffs.
///
/// The layout is computed over the full graph with a fixed RNG seed, so the
/// same dataset and seed always produce the same picture and nodes do not
/// jump around as the cutoff slider moves. Sub-graphs at earlier cutoffs
/// look their positions up here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLayout {
    seed: u64,
    positions: BTreeMap<String, Position>,
}

impl GraphLayout {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn position(&self, person: &str) -> Option<Position> {
        self.positions.get(person).copied()
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Compute a force-directed layout for `graph`.
///
/// Standard Fruchterman-Reingold: repulsion between every pair of nodes,
/// attraction along edges scaled by edge weight, displacement capped by a
/// temperature that cools linearly over the iterations. Nodes are visited in
/// identifier order and the RNG is seeded, so the result is deterministic.
pub fn spring_layout(graph: &RelationGraph, seed: u64, iterations: usize) -> GraphLayout {
    let nodes: Vec<&str> = graph.nodes().collect();
    let n = nodes.len();
    let mut rng = StdRng::seed_from_u64(seed);

    if n == 0 {
        return GraphLayout {
            seed,
            positions: BTreeMap::new(),
        };
    }
    if n == 1 {
        let mut positions = BTreeMap::new();
        positions.insert(nodes[0].to_string(), Position { x: 0.0, y: 0.0 });
        return GraphLayout { seed, positions };
    }

    let index: BTreeMap<&str, usize> = nodes.iter().enumerate().map(|(i, p)| (*p, i)).collect();
    let edges: Vec<(usize, usize, f64)> = graph
        .edges()
        .map(|(pair, weight)| (index[pair.first()], index[pair.second()], weight as f64))
        .collect();

    let mut xs: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut ys: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();

    // Ideal spring length for a 2x2 canvas.
    let k = (4.0 / n as f64).sqrt();
    let mut temperature = 0.2;
    let cooling = temperature / iterations.max(1) as f64;

    for _ in 0..iterations {
        let mut dx = vec![0.0f64; n];
        let mut dy = vec![0.0f64; n];

        // Repulsion between all pairs.
        for i in 0..n {
            for j in (i + 1)..n {
                let (ddx, ddy) = (xs[i] - xs[j], ys[i] - ys[j]);
                let dist = (ddx * ddx + ddy * ddy).sqrt().max(1e-6);
                let force = k * k / dist;
                let (fx, fy) = (ddx / dist * force, ddy / dist * force);
                dx[i] += fx;
                dy[i] += fy;
                dx[j] -= fx;
                dy[j] -= fy;
            }
        }

        // Attraction along edges, stronger for heavier edges.
        for &(i, j, weight) in &edges {
            let (ddx, ddy) = (xs[i] - xs[j], ys[i] - ys[j]);
            let dist = (ddx * ddx + ddy * ddy).sqrt().max(1e-6);
            let force = dist * dist / k * weight.sqrt();
            let (fx, fy) = (ddx / dist * force, ddy / dist * force);
            dx[i] -= fx;
            dy[i] -= fy;
            dx[j] += fx;
            dy[j] += fy;
        }

        // Apply displacements, capped by the current temperature.
        for i in 0..n {
            let disp = (dx[i] * dx[i] + dy[i] * dy[i]).sqrt().max(1e-6);
            let scale = disp.min(temperature) / disp;
            xs[i] = (xs[i] + dx[i] * scale).clamp(-1.0, 1.0);
            ys[i] = (ys[i] + dy[i] * scale).clamp(-1.0, 1.0);
        }

        temperature = (temperature - cooling).max(1e-3);
    }

    let positions = nodes
        .iter()
        .enumerate()
        .map(|(i, person)| (person.to_string(), Position { x: xs[i], y: ys[i] }))
        .collect();

    GraphLayout { seed, positions }
}
