/*!
# End-to-End Tests for the Distributed Runner

Each test executes a full multi-threaded GHS run on a small topology and checks
the result against hand-computed trees and the Kruskal reference, plus the
termination invariants every run must satisfy: a quiet state machine at every
node, a spanning edge set of exactly `n - 1` entries, and channel
classifications that agree across each adopted edge.
*/

use std::collections::BTreeSet;

use fragmenta::core::generators::{complete_topology, grid_topology, linear_topology};
use fragmenta::core::ghs::{RunReport, ghs_mst, ghs_mst_with_report};
use fragmenta::core::mst::kruskal_mst;
use fragmenta::core::protocol::NodeState;
use fragmenta::core::types::{INFINITE_WEIGHT, MstEdge, Topology};
use ordered_float::OrderedFloat;

fn edge_set(edges: &[MstEdge]) -> BTreeSet<(usize, usize)> {
    edges.iter().map(|e| e.endpoints()).collect()
}

/// Asserts the invariants that must hold for any finished run.
fn assert_run_invariants(topology: &Topology, report: &RunReport) {
    let n = topology.node_count();
    assert_eq!(report.edges.len(), n - 1, "spanning tree must have n-1 edges");
    assert_eq!(report.nodes.len(), n);

    // Adopted edges exist in the topology with their original weights, and at
    // least one endpoint classified the channel as a branch.
    for edge in &report.edges {
        let weight = topology
            .edge_weight(edge.u, edge.v)
            .expect("adopted edge must exist in the topology");
        assert_eq!(weight, edge.weight);
        let u = &report.nodes[edge.u.index()];
        let v = &report.nodes[edge.v.index()];
        assert!(
            u.branches.contains(&edge.v) || v.branches.contains(&edge.u),
            "adopted edge {:?} has no branch endpoint",
            edge.endpoints()
        );
    }

    // Quiet state machines, one shared fragment identity.
    let name = report.nodes[0].fragment_name;
    assert!(name.is_some());
    for node in &report.nodes {
        assert_eq!(node.state, NodeState::Found);
        assert_eq!(node.find_count, 0);
        assert_eq!(node.test_edge, None);
        assert_eq!(node.fragment_name, name);
    }

    // No channel may stay unclassified while its far side became a branch.
    for node in &report.nodes {
        for &far in &node.branches {
            assert!(
                !report.nodes[far.index()].unclassified.contains(&node.id),
                "edge ({}, {}) is branch on one side and basic on the other",
                node.id.index(),
                far.index()
            );
        }
    }

    // The edge set is a spanning tree: n-1 edges and no cycles. Walking the
    // edges with a union-find that rejects same-root unions proves both.
    let mut parent: Vec<usize> = (0..n).collect();
    fn root(parent: &mut Vec<usize>, mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for edge in &report.edges {
        let (ru, rv) = (
            root(&mut parent, edge.u.index()),
            root(&mut parent, edge.v.index()),
        );
        assert_ne!(ru, rv, "adopted edges contain a cycle");
        parent[ru] = rv;
    }

    // Weight agrees with the centralized reference.
    let (_, reference_total) = kruskal_mst(topology).unwrap();
    assert_eq!(report.total_weight, reference_total);
}

#[test]
fn test_linear_four_nodes() {
    let topology = linear_topology(4).unwrap();
    let report = ghs_mst_with_report(&topology).unwrap();

    assert_eq!(
        edge_set(&report.edges),
        BTreeSet::from([(0, 1), (1, 2), (2, 3)])
    );
    assert_eq!(report.total_weight, OrderedFloat(6.0));
    assert_run_invariants(&topology, &report);

    // On a path every edge is in the tree, so every channel ends as a branch
    // on both sides and nothing is ever rejected.
    for node in &report.nodes {
        assert_eq!(node.branches.len(), topology.neighbors(node.id).count());
        assert!(node.rejected.is_empty());
        assert!(node.unclassified.is_empty());
    }
}

#[test]
fn test_complete_k4_lexicographic_weights() {
    let topology = complete_topology(4).unwrap();
    let report = ghs_mst_with_report(&topology).unwrap();

    assert_eq!(
        edge_set(&report.edges),
        BTreeSet::from([(0, 1), (0, 2), (0, 3)])
    );
    assert_eq!(report.total_weight, OrderedFloat(6.0));
    assert_run_invariants(&topology, &report);
}

#[test]
fn test_complete_k4_reversed_weights() {
    let mut topology = Topology::new();
    let nodes: Vec<_> = (0..4).map(|_| topology.add_node()).collect();
    topology.add_edge(nodes[0], nodes[1], 6.0);
    topology.add_edge(nodes[0], nodes[2], 5.0);
    topology.add_edge(nodes[0], nodes[3], 4.0);
    topology.add_edge(nodes[1], nodes[2], 3.0);
    topology.add_edge(nodes[1], nodes[3], 2.0);
    topology.add_edge(nodes[2], nodes[3], 1.0);

    let report = ghs_mst_with_report(&topology).unwrap();
    assert_eq!(
        edge_set(&report.edges),
        BTreeSet::from([(2, 3), (1, 3), (0, 3)])
    );
    assert_run_invariants(&topology, &report);
}

#[test]
fn test_grid_three_by_three() {
    let topology = grid_topology(9, 1234).unwrap();
    assert_eq!(topology.edge_count(), 12);

    let report = ghs_mst_with_report(&topology).unwrap();
    assert_eq!(report.edges.len(), 8);

    let (reference, _) = kruskal_mst(&topology).unwrap();
    assert_eq!(edge_set(&report.edges), edge_set(&reference));
    assert_run_invariants(&topology, &report);
}

#[test]
fn test_two_node_path() {
    let mut topology = Topology::new();
    let a = topology.add_node();
    let b = topology.add_node();
    topology.add_edge(a, b, 42.0);

    let report = ghs_mst_with_report(&topology).unwrap();
    assert_eq!(edge_set(&report.edges), BTreeSet::from([(0, 1)]));
    assert_eq!(report.edges[0].weight, OrderedFloat(42.0));

    // Both endpoints finish their find wave knowing of no outgoing edge.
    for node in &report.nodes {
        assert_eq!(node.state, NodeState::Found);
        assert_eq!(node.best_wt, INFINITE_WEIGHT);
    }
    assert_run_invariants(&topology, &report);
}

#[test]
fn test_star_with_five_spokes() {
    let mut topology = Topology::new();
    let nodes: Vec<_> = (0..6).map(|_| topology.add_node()).collect();
    for (spoke, weight) in (1..6).zip([10.0, 11.0, 12.0, 13.0, 14.0]) {
        topology.add_edge(nodes[0], nodes[spoke], weight);
    }

    let report = ghs_mst_with_report(&topology).unwrap();
    assert_eq!(
        edge_set(&report.edges),
        BTreeSet::from([(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)])
    );
    assert_eq!(report.total_weight, OrderedFloat(60.0));

    // The only symmetric merge happens across the cheapest spoke, whose weight
    // names the final fragment; everyone agrees on it.
    assert_eq!(report.nodes[0].fragment_name, Some(OrderedFloat(10.0)));
    for node in &report.nodes {
        assert_eq!(node.fragment_name, Some(OrderedFloat(10.0)));
    }
    assert_run_invariants(&topology, &report);
}

#[test]
fn test_single_node_is_trivially_spanned() {
    let mut topology = Topology::new();
    topology.add_node();

    let (edges, total) = ghs_mst(&topology).unwrap();
    assert!(edges.is_empty());
    assert_eq!(total, OrderedFloat(0.0));
}

#[test]
fn test_disconnected_topology_is_rejected() {
    let mut topology = Topology::new();
    let a = topology.add_node();
    let b = topology.add_node();
    let c = topology.add_node();
    let d = topology.add_node();
    topology.add_edge(a, b, 1.0);
    topology.add_edge(c, d, 2.0);

    assert!(ghs_mst(&topology).is_err());
}

#[test]
fn test_repeated_runs_agree() {
    let topology = grid_topology(16, 77).unwrap();
    let (first, first_total) = ghs_mst(&topology).unwrap();
    let (second, second_total) = ghs_mst(&topology).unwrap();
    assert_eq!(edge_set(&first), edge_set(&second));
    assert_eq!(first_total, second_total);
}

#[test]
fn test_larger_complete_topology_matches_reference() {
    let topology = complete_topology(8).unwrap();
    let report = ghs_mst_with_report(&topology).unwrap();
    let (reference, _) = kruskal_mst(&topology).unwrap();
    assert_eq!(edge_set(&report.edges), edge_set(&reference));
    assert_run_invariants(&topology, &report);
}
