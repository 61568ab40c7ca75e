/*!
# Topology Validation Utilities

Precondition checks for distributed runs. The GHS algorithm is only correct on
a connected topology with strictly positive, pairwise distinct edge weights,
so the runner rejects anything else before the first message flows.
*/

use std::collections::{HashSet, HashMap};

use crate::core::error::{FragmentaError, Result};
use crate::core::types::{Topology, Weight};

/// Returns true if the topology contains no nodes.
pub fn is_empty(topology: &Topology) -> bool {
    topology.is_empty()
}

/// Returns true if the topology is connected.
pub fn is_connected(topology: &Topology) -> bool {
    if topology.is_empty() {
        return false; // Conventionally, empty graphs are not considered connected
    }

    let graph = topology.petgraph();
    let Some(start) = graph.node_indices().next() else {
        return false;
    };
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(node) = stack.pop() {
        for neighbor in graph.neighbors_undirected(node) {
            if visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    visited.len() == graph.node_count()
}

/// Returns true if any edge connects a node to itself.
pub fn has_self_loops(topology: &Topology) -> bool {
    topology.edges().any(|(u, v, _)| u == v)
}

/// Returns true if any edge weight is zero, negative, or non-finite.
pub fn has_nonpositive_weights(topology: &Topology) -> bool {
    topology
        .edges()
        .any(|(_, _, w)| w.0 <= 0.0 || !w.0.is_finite())
}

/// Returns the first weight that appears on more than one edge, if any.
pub fn duplicate_weight(topology: &Topology) -> Option<Weight> {
    let mut seen: HashMap<Weight, u32> = HashMap::new();
    for (_, _, w) in topology.edges() {
        let count = seen.entry(w).or_insert(0);
        *count += 1;
        if *count > 1 {
            return Some(w);
        }
    }
    None
}

/// Validates the preconditions of a distributed run.
///
/// Checks that the topology is non-empty, connected, free of self-loops, and
/// that every weight is finite, strictly positive, and unique.
///
/// # Returns
/// `Ok(())` if all preconditions pass, or an `Err(FragmentaError)` naming the
/// first violated one.
pub fn validate_for_run(topology: &Topology) -> Result<()> {
    if is_empty(topology) {
        return Err(FragmentaError::invalid_topology(
            "Topology is empty, nothing to span",
        ));
    }
    if has_self_loops(topology) {
        return Err(FragmentaError::invalid_topology(
            "Topology contains a self-loop",
        ));
    }
    if has_nonpositive_weights(topology) {
        return Err(FragmentaError::invalid_topology(
            "Edge weights must be finite and strictly positive",
        ));
    }
    if let Some(w) = duplicate_weight(topology) {
        return Err(FragmentaError::invalid_topology(format!(
            "Edge weight {} is not unique",
            w.0
        )));
    }
    if !is_connected(topology) {
        return Err(FragmentaError::disconnected(
            "The minimum spanning tree requires a connected topology",
        ));
    }
    Ok(())
}
