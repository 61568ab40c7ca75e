/*!
# MST Collector

Single passive observer of a run. Nodes announce every edge they adopt; the
terminating node announces halt. Announcements travel over one multi-producer
channel and are folded into the collector by whoever drains it (the runner),
so the collector itself needs no locking.

Both endpoints of a merge may independently announce the same undirected edge,
so insertion is idempotent on the normalized endpoint pair.
*/

use std::collections::HashMap;

use crate::core::error::FragmentaError;
use crate::core::types::{MstEdge, NodeId, Weight};

/// Event emitted by a node toward the collector side of a run.
#[derive(Debug, Clone)]
pub(crate) enum CollectorEvent {
    /// Node `u` classified its channel to `v` as a tree edge.
    EdgeAdopted { u: NodeId, v: NodeId, weight: Weight },
    /// The spanning tree is complete.
    Halt,
    /// A node hit a protocol violation or a torn-down channel and stopped.
    Fault { node: NodeId, error: FragmentaError },
}

/// Accumulates adopted edges until halt.
#[derive(Debug)]
pub(crate) struct Collector {
    edges: HashMap<(usize, usize), Weight>,
    active: bool,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self {
            edges: HashMap::new(),
            active: true,
        }
    }

    /// Records an adopted edge. Re-announcements of the same undirected edge
    /// are no-ops.
    pub(crate) fn edge_adopted(&mut self, u: NodeId, v: NodeId, weight: Weight) {
        let key = if u.index() <= v.index() {
            (u.index(), v.index())
        } else {
            (v.index(), u.index())
        };
        self.edges.entry(key).or_insert(weight);
    }

    /// Marks the run finished.
    pub(crate) fn halt(&mut self) {
        self.active = false;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Publishes the adopted edge set, sorted by weight.
    pub(crate) fn into_edges(self) -> Vec<MstEdge> {
        let mut edges: Vec<MstEdge> = self
            .edges
            .into_iter()
            .map(|((u, v), weight)| MstEdge {
                u: NodeId::from_index(u),
                v: NodeId::from_index(v),
                weight,
            })
            .collect();
        edges.sort_by(|a, b| a.weight.cmp(&b.weight));
        edges
    }
}
