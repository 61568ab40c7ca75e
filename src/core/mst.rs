/*!
# Centralized Minimum Spanning Tree References

Sequential MST algorithms used as oracles for the distributed runner:

- **Kruskal's Algorithm:**
  Sorts all edges and uses a union–find data structure to avoid cycles.

- **Prim's Algorithm:**
  A greedy approach that grows the MST by adding the minimum edge at each step.
  It computes an MST forest (covering all connected components).

Unlike the distributed runner, neither function insists on a connected input:
on a disconnected topology they return a spanning forest, which is occasionally
what a test wants to observe.
*/

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::core::error::{FragmentaError, Result};
use crate::core::types::{MstEdge, NodeId, Topology, Weight};

/// A simple union–find (disjoint-set) data structure.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    /// Creates a new union–find structure for `n` elements.
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Finds the representative of the set that contains `i`, using path compression.
    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    /// Unions the sets containing `i` and `j` using union by rank.
    fn union(&mut self, i: usize, j: usize) {
        let i = self.find(i);
        let j = self.find(j);
        if i == j {
            return;
        }
        match self.rank[i].cmp(&self.rank[j]) {
            Ordering::Less => self.parent[i] = j,
            Ordering::Greater => self.parent[j] = i,
            Ordering::Equal => {
                self.parent[j] = i;
                self.rank[i] += 1;
            }
        }
    }
}

///
/// ## Kruskal's MST Algorithm
///
/// Computes the MST by first sorting all edges by weight and then selecting the
/// smallest edges one by one while avoiding cycles using a union–find data
/// structure.
///
/// # Returns
///
/// A `Result` containing a tuple with:
/// - A vector of MST edges (`MstEdge`), sorted by weight.
/// - The total weight of the MST.
///
/// Returns an error if the input topology is empty.
pub fn kruskal_mst(topology: &Topology) -> Result<(Vec<MstEdge>, Weight)> {
    if topology.is_empty() {
        return Err(FragmentaError::invalid_topology(
            "Topology is empty, cannot compute MST.",
        ));
    }

    let n = topology.node_count();
    let mut edges: Vec<(NodeId, NodeId, Weight)> = topology.edges().collect();
    edges.sort_by(|a, b| a.2.cmp(&b.2));

    let mut uf = UnionFind::new(n);
    let mut mst_edges = Vec::new();
    let mut total_weight = OrderedFloat(0.0);

    for (u, v, w) in edges {
        let ru = uf.find(u.index());
        let rv = uf.find(v.index());
        if ru != rv {
            uf.union(ru, rv);
            mst_edges.push(MstEdge { u, v, weight: w });
            total_weight += w;
        }
    }
    Ok((mst_edges, total_weight))
}

///
/// ## Prim's MST Algorithm
///
/// Computes the MST using Prim's algorithm, processing every connected
/// component (i.e. computing an MST forest on disconnected inputs).
///
/// # Returns
///
/// A `Result` containing a tuple with:
/// - A vector of MST edges (`MstEdge`) in adoption order.
/// - The total weight of the MST.
///
/// Returns an error if the input topology is empty.
pub fn prim_mst(topology: &Topology) -> Result<(Vec<MstEdge>, Weight)> {
    if topology.is_empty() {
        return Err(FragmentaError::invalid_topology(
            "Topology is empty, cannot compute MST.",
        ));
    }

    let n = topology.node_count();
    let mut mst_edges = Vec::new();
    let mut total_weight = OrderedFloat(0.0);
    let mut in_tree = vec![false; n];

    // Process each connected component.
    for start in topology.nodes() {
        if in_tree[start.index()] {
            continue;
        }
        in_tree[start.index()] = true;
        let mut heap = std::collections::BinaryHeap::new();
        for (neighbor, weight) in topology.neighbors(start) {
            heap.push(std::cmp::Reverse((weight, start, neighbor)));
        }

        while let Some(std::cmp::Reverse((w, from, to))) = heap.pop() {
            if in_tree[to.index()] {
                continue;
            }
            in_tree[to.index()] = true;
            mst_edges.push(MstEdge {
                u: from,
                v: to,
                weight: w,
            });
            total_weight += w;
            for (neighbor, weight) in topology.neighbors(to) {
                if !in_tree[neighbor.index()] {
                    heap.push(std::cmp::Reverse((weight, to, neighbor)));
                }
            }
        }
    }

    Ok((mst_edges, total_weight))
}
