/*!
# Topology Generators

This module provides the named topologies a driver can start a distributed run
on: linear paths, complete graphs, near-square grids, and stars. Every
generator produces pairwise distinct, strictly positive weights, so its output
passes [`crate::core::validation::validate_for_run`] unchanged.

The grid generator uses a seeded random number generator for reproducibility.

# Examples

```rust
use fragmenta::core::generators::{TopologyKind, build_topology};

let grid = build_topology(TopologyKind::Grid, 9, 42).expect("Failed to generate grid");
assert_eq!(grid.node_count(), 9);
assert_eq!(grid.edge_count(), 12);
```
*/

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::error::{FragmentaError, Result};
use crate::core::types::{NodeId, Topology};

/// Named topology shapes offered to drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    /// Path 0 - 1 - ... - n-1 with increasing weights.
    Linear,
    /// Complete graph with weights in lexicographic edge order.
    Complete,
    /// Near-square grid with a 4-neighborhood and shuffled weights.
    Grid,
    /// Hub node 0 with ascending spoke weights.
    Star,
}

impl FromStr for TopologyKind {
    type Err = FragmentaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(TopologyKind::Linear),
            "complete" => Ok(TopologyKind::Complete),
            "grid" => Ok(TopologyKind::Grid),
            "star" => Ok(TopologyKind::Star),
            other => Err(FragmentaError::invalid_argument(format!(
                "Unknown topology kind '{}' (expected linear, complete, grid, or star)",
                other
            ))),
        }
    }
}

/// Builds the requested topology. The seed only affects the grid layout.
pub fn build_topology(kind: TopologyKind, n: usize, seed: u64) -> Result<Topology> {
    match kind {
        TopologyKind::Linear => linear_topology(n),
        TopologyKind::Complete => complete_topology(n),
        TopologyKind::Grid => grid_topology(n, seed),
        TopologyKind::Star => star_topology(n),
    }
}

fn require_nodes(n: usize) -> Result<()> {
    if n == 0 {
        return Err(FragmentaError::invalid_argument(
            "Number of nodes must be greater than zero.",
        ));
    }
    Ok(())
}

/// Generates a path topology: edge `i - i+1` carries weight `i + 1`.
pub fn linear_topology(n: usize) -> Result<Topology> {
    require_nodes(n)?;
    let mut topology = Topology::with_capacity(n, n.saturating_sub(1));
    let nodes: Vec<NodeId> = (0..n).map(|_| topology.add_node()).collect();
    for i in 1..n {
        topology.add_edge(nodes[i - 1], nodes[i], i as f64);
    }
    Ok(topology)
}

/// Generates a complete topology with weights 1, 2, 3, ... assigned in
/// lexicographic order of the `(i, j)` pairs with `i < j`.
pub fn complete_topology(n: usize) -> Result<Topology> {
    require_nodes(n)?;
    let mut topology = Topology::with_capacity(n, n * (n - 1) / 2);
    let nodes: Vec<NodeId> = (0..n).map(|_| topology.add_node()).collect();
    let mut weight = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            weight += 1.0;
            topology.add_edge(nodes[i], nodes[j], weight);
        }
    }
    Ok(topology)
}

/// Generates a grid topology: `n` nodes laid out row-major in a grid of width
/// `ceil(sqrt(n))`, each linked to its right and lower neighbor. The weights
/// are a seeded shuffle of `1..=edge_count`, so they are distinct by
/// construction.
pub fn grid_topology(n: usize, seed: u64) -> Result<Topology> {
    require_nodes(n)?;
    let side = (n as f64).sqrt().ceil() as usize;
    let mut topology = Topology::with_capacity(n, 2 * n);
    let nodes: Vec<NodeId> = (0..n).map(|_| topology.add_node()).collect();

    let mut pairs = Vec::new();
    for i in 0..n {
        let col = i % side;
        if col + 1 < side && i + 1 < n {
            pairs.push((i, i + 1));
        }
        if i + side < n {
            pairs.push((i, i + side));
        }
    }

    let mut weights: Vec<f64> = (1..=pairs.len()).map(|w| w as f64).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    weights.shuffle(&mut rng);

    for ((u, v), w) in pairs.into_iter().zip(weights) {
        topology.add_edge(nodes[u], nodes[v], w);
    }
    Ok(topology)
}

/// Generates a star topology: node 0 is the hub, spoke `0 - i` carries
/// weight `i`.
pub fn star_topology(n: usize) -> Result<Topology> {
    require_nodes(n)?;
    let mut topology = Topology::with_capacity(n, n.saturating_sub(1));
    let nodes: Vec<NodeId> = (0..n).map(|_| topology.add_node()).collect();
    for i in 1..n {
        topology.add_edge(nodes[0], nodes[i], i as f64);
    }
    Ok(topology)
}
