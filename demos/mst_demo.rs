//! Runs the distributed algorithm on a named topology and prints the tree.
//!
//! Usage: `cargo run --example mst_demo -- [kind] [nodes] [seed]`
//! where `kind` is one of `linear`, `complete`, `grid`, or `star`.
//! Set `DEBUG_FRAGMENTA=1` (with the `logging` feature) to watch every
//! message, postponement, and adoption as it happens.

use std::env;
use std::process;

use fragmenta::core::generators::{TopologyKind, build_topology};
use fragmenta::core::ghs::ghs_mst_with_report;
use fragmenta::core::mst::kruskal_mst;

fn main() {
    let args: Vec<String> = env::args().collect();
    let kind: TopologyKind = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("grid")
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(2);
        });
    let n: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(9);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);

    let topology = build_topology(kind, n, seed).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(2);
    });
    println!(
        "Running GHS on a {:?} topology: {} nodes, {} edges",
        kind,
        topology.node_count(),
        topology.edge_count()
    );

    let report = ghs_mst_with_report(&topology).unwrap_or_else(|e| {
        eprintln!("run failed: {e}");
        process::exit(1);
    });

    println!("Minimum spanning tree ({} edges):", report.edges.len());
    for edge in &report.edges {
        let (u, v) = edge.endpoints();
        println!("  {} -- {}  (weight {})", u, v, edge.weight.0);
    }
    println!("Total weight: {}", report.total_weight.0);

    for node in &report.nodes {
        println!(
            "node {}: level {}, fragment {:?}, {} branch / {} rejected channels",
            node.id.index(),
            node.level,
            node.fragment_name.map(|w| w.0),
            node.branches.len(),
            node.rejected.len()
        );
    }

    match kruskal_mst(&topology) {
        Ok((_, reference_total)) if reference_total == report.total_weight => {
            println!("Kruskal reference agrees: {}", reference_total.0);
        }
        Ok((_, reference_total)) => {
            eprintln!(
                "Kruskal reference DISAGREES: {} vs {}",
                reference_total.0, report.total_weight.0
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("reference failed: {e}");
            process::exit(1);
        }
    }
}
