/*!
# Fragmenta Core Types

This module defines the data model shared by the whole crate: node identifiers,
totally ordered edge weights, the undirected weighted `Topology` that a run is
started on, and the `MstEdge` records the algorithms produce.

The `Topology` struct is a wrapper around petgraph's undirected `Graph` that
provides the small, uniform API the rest of the crate needs. Edge weights are
`OrderedFloat<f64>` so they can be compared, hashed, and used as fragment names.

# Examples

```rust
use fragmenta::core::types::Topology;

let mut t = Topology::new();
let a = t.add_node();
let b = t.add_node();
t.add_edge(a, b, 1.5);
assert_eq!(t.node_count(), 2);
assert_eq!(t.edge_weight(a, b).map(|w| w.0), Some(1.5));
```
*/

use ordered_float::OrderedFloat;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Edge weight type. Weights double as fragment names, so they must be totally
/// ordered and comparable for equality.
pub type Weight = OrderedFloat<f64>;

/// Fragment level type.
pub type Level = u32;

/// Sentinel weight meaning "no outgoing edge known". This is the value a subtree
/// reports upward when every incident edge turned out to be internal.
pub const INFINITE_WEIGHT: Weight = OrderedFloat(f64::INFINITY);

/// Wrapper for `NodeIndex` that provides additional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) NodeIndex);

impl NodeId {
    /// Returns the numeric part of the node's index.
    pub fn index(&self) -> usize {
        self.0.index()
    }

    /// Creates a new `NodeId` from a `NodeIndex`.
    pub(crate) fn new(index: NodeIndex) -> Self {
        Self(index)
    }

    /// Creates a `NodeId` from a raw index.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(NodeIndex::new(index))
    }
}

/// Represents an edge in a minimum spanning tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MstEdge {
    pub u: NodeId,
    pub v: NodeId,
    pub weight: Weight,
}

impl MstEdge {
    /// Returns the endpoints as a normalized `(low, high)` index pair, which is
    /// the canonical form for comparing undirected edges.
    pub fn endpoints(&self) -> (usize, usize) {
        let (a, b) = (self.u.index(), self.v.index());
        if a <= b { (a, b) } else { (b, a) }
    }
}

/// An undirected weighted graph describing which processes may exchange messages
/// and at what cost.
///
/// Nodes carry no attributes; the topology exists solely to describe the
/// communication graph a distributed run is executed on.
#[derive(Debug, Clone)]
pub struct Topology {
    inner: UnGraph<(), Weight>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self {
            inner: UnGraph::new_undirected(),
        }
    }

    /// Creates an empty topology with preallocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            inner: UnGraph::with_capacity(nodes, edges),
        }
    }

    /// Adds a node and returns its identifier. Identifiers are dense indices
    /// assigned in insertion order.
    pub fn add_node(&mut self) -> NodeId {
        NodeId::new(self.inner.add_node(()))
    }

    /// Adds an undirected edge between `u` and `v` with the given weight.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: impl Into<Weight>) {
        self.inner.add_edge(u.0, v.0, weight.into());
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Returns true if the topology has no nodes.
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Returns an iterator over all node identifiers.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.node_indices().map(NodeId::new)
    }

    /// Returns an iterator over all edges as `(u, v, weight)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Weight)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (NodeId::new(e.source()), NodeId::new(e.target()), *e.weight()))
    }

    /// Returns an iterator over the neighbors of `u` together with the weight of
    /// the connecting edge.
    pub fn neighbors(&self, u: NodeId) -> impl Iterator<Item = (NodeId, Weight)> + '_ {
        self.inner.edges(u.0).map(move |e| {
            let other = if e.source() == u.0 {
                e.target()
            } else {
                e.source()
            };
            (NodeId::new(other), *e.weight())
        })
    }

    /// Returns the weight of the edge between `u` and `v`, if one exists.
    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<Weight> {
        self.inner
            .find_edge(u.0, v.0)
            .and_then(|e| self.inner.edge_weight(e).copied())
    }

    pub(crate) fn petgraph(&self) -> &UnGraph<(), Weight> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_basics() {
        let mut t = Topology::new();
        let a = t.add_node();
        let b = t.add_node();
        let c = t.add_node();
        t.add_edge(a, b, 1.0);
        t.add_edge(b, c, 2.0);

        assert_eq!(t.node_count(), 3);
        assert_eq!(t.edge_count(), 2);
        assert_eq!(t.edge_weight(a, b), Some(OrderedFloat(1.0)));
        assert_eq!(t.edge_weight(a, c), None);

        let mut around_b: Vec<_> = t.neighbors(b).map(|(n, w)| (n.index(), w.0)).collect();
        around_b.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(around_b, vec![(0, 1.0), (2, 2.0)]);
    }

    #[test]
    fn test_mst_edge_endpoints_normalized() {
        let mut t = Topology::new();
        let a = t.add_node();
        let b = t.add_node();
        let edge = MstEdge {
            u: b,
            v: a,
            weight: OrderedFloat(3.0),
        };
        assert_eq!(edge.endpoints(), (0, 1));
    }

    #[test]
    fn test_infinite_weight_dominates() {
        assert!(OrderedFloat(1e12) < INFINITE_WEIGHT);
        assert_eq!(INFINITE_WEIGHT, INFINITE_WEIGHT);
    }
}
