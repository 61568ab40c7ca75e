/*!
# Distributed GHS Minimum Spanning Tree

Hosting runtime for the Gallager–Humblet–Spira algorithm. Every vertex of the
topology becomes an independent agent on its own OS thread, communicating only
through asynchronous per-edge FIFO channels. The calling thread plays the
collector: it folds edge-adoption announcements into the result set until one
node detects completion and announces halt.

The entry points mirror the centralized algorithms in [`crate::core::mst`], so
a distributed run and a Kruskal reference are interchangeable in tests:

```rust
use fragmenta::core::generators::complete_topology;
use fragmenta::core::ghs::ghs_mst;
use fragmenta::core::mst::kruskal_mst;

let topology = complete_topology(4).unwrap();
let (distributed, total) = ghs_mst(&topology).unwrap();
let (reference, reference_total) = kruskal_mst(&topology).unwrap();
assert_eq!(total, reference_total);
assert_eq!(distributed.len(), reference.len());
```
*/

use std::collections::HashMap;
use std::thread;

use crossbeam_channel::unbounded;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::collector::{Collector, CollectorEvent};
use crate::core::error::{FragmentaError, Result};
use crate::core::node::NodeAgent;
use crate::core::protocol::NodeState;
use crate::core::transport::Fabric;
use crate::core::types::{Level, MstEdge, NodeId, Topology, Weight};
use crate::core::validation::validate_for_run;

/// Final state of one node after a run, as captured when the runner reaps its
/// thread. Useful for asserting the algorithm's termination invariants.
#[derive(Debug, Clone)]
pub struct NodeSummary {
    pub id: NodeId,
    pub state: NodeState,
    pub level: Level,
    pub fragment_name: Option<Weight>,
    pub best_wt: Weight,
    pub find_count: u32,
    pub test_edge: Option<NodeId>,
    /// Neighbors whose channel ended classified as a tree edge, ascending.
    pub branches: Vec<NodeId>,
    /// Neighbors whose channel ended classified as intra-fragment, ascending.
    pub rejected: Vec<NodeId>,
    /// Neighbors whose channel was never classified, ascending.
    pub unclassified: Vec<NodeId>,
}

/// Everything a run produces: the tree, its weight, and per-node final states.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// MST edges, sorted by weight.
    pub edges: Vec<MstEdge>,
    pub total_weight: Weight,
    /// One summary per node, sorted by node index. Empty for the trivial
    /// single-node run, which never starts any agent.
    pub nodes: Vec<NodeSummary>,
}

/// Computes the minimum spanning tree of `topology` with the distributed GHS
/// algorithm.
///
/// The topology must be connected, free of self-loops, and carry strictly
/// positive, pairwise distinct, finite weights; anything else is rejected
/// before a single message flows.
///
/// # Returns
///
/// A `Result` containing a tuple with:
/// - A vector of MST edges (`MstEdge`), sorted by weight.
/// - The total weight of the MST.
pub fn ghs_mst(topology: &Topology) -> Result<(Vec<MstEdge>, Weight)> {
    let report = ghs_mst_with_report(topology)?;
    Ok((report.edges, report.total_weight))
}

/// Like [`ghs_mst`], but also returns the final state of every node.
pub fn ghs_mst_with_report(topology: &Topology) -> Result<RunReport> {
    validate_for_run(topology)?;
    let n = topology.node_count();
    if n == 1 {
        // Nothing to wake across; the tree is trivially empty.
        return Ok(RunReport {
            edges: Vec::new(),
            total_weight: OrderedFloat(0.0),
            nodes: Vec::new(),
        });
    }

    let (fabric, receivers) = Fabric::new(n);
    let (event_tx, event_rx) = unbounded();

    let mut handles = Vec::with_capacity(n);
    for (index, inbox) in receivers.into_iter().enumerate() {
        let id = NodeId::from_index(index);
        let weights: HashMap<NodeId, Weight> = topology.neighbors(id).collect();
        let agent = NodeAgent::new(id, weights, inbox, fabric.clone(), event_tx.clone())?;
        let handle = thread::Builder::new()
            .name(format!("ghs-node-{index}"))
            .spawn(move || agent.run())?;
        handles.push(handle);
    }
    // Only the agents announce events from here on.
    drop(event_tx);

    let mut collector = Collector::new();
    let mut fault: Option<FragmentaError> = None;
    while collector.is_active() {
        match event_rx.recv() {
            Ok(CollectorEvent::EdgeAdopted { u, v, weight }) => {
                collector.edge_adopted(u, v, weight);
            }
            Ok(CollectorEvent::Halt) => {
                debug!("halt observed, reaping node threads");
                collector.halt();
            }
            Ok(CollectorEvent::Fault { node, error }) => {
                debug!(node = node.index(), %error, "node fault");
                fault = Some(error);
                break;
            }
            Err(_) => {
                fault = Some(FragmentaError::transport(
                    "all nodes exited before halt was announced",
                ));
                break;
            }
        }
    }

    fabric.shutdown_all();
    let mut summaries = Vec::with_capacity(n);
    for handle in handles {
        match handle.join() {
            Ok(Ok(summary)) => summaries.push(summary),
            Ok(Err(error)) => {
                fault.get_or_insert(error);
            }
            Err(_) => {
                fault.get_or_insert(FragmentaError::generic("a node thread panicked"));
            }
        }
    }
    if let Some(error) = fault {
        return Err(error);
    }

    summaries.sort_by_key(|s| s.id.index());
    let edges = collector.into_edges();
    if edges.len() != n - 1 {
        return Err(FragmentaError::algorithm_error(format!(
            "halted with {} adopted edges for {} nodes",
            edges.len(),
            n
        )));
    }
    let total_weight = edges
        .iter()
        .fold(OrderedFloat(0.0), |acc, e| acc + e.weight);
    Ok(RunReport {
        edges,
        total_weight,
        nodes: summaries,
    })
}
