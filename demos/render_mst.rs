//! Runs the algorithm on a grid and renders the result as PNG and DOT files.
//!
//! Usage: `cargo run --example render_mst -- [nodes] [seed]`

use std::env;
use std::fs;
use std::process;

use fragmenta::core::generators::grid_topology;
use fragmenta::core::ghs::ghs_mst;
use fragmenta::core::visualization::{Layout, RenderConfig, render_png, to_dot};

fn main() {
    let args: Vec<String> = env::args().collect();
    let n: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(16);
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);

    let topology = grid_topology(n, seed).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(2);
    });
    let (edges, total) = ghs_mst(&topology).unwrap_or_else(|e| {
        eprintln!("run failed: {e}");
        process::exit(1);
    });
    println!("MST of {} nodes has total weight {}", n, total.0);

    let config = RenderConfig {
        layout: Layout::Grid,
        ..RenderConfig::default()
    };
    if let Err(e) = render_png(&topology, &edges, "mst.png", &config) {
        eprintln!("PNG rendering failed: {e}");
        process::exit(1);
    }
    if let Err(e) = fs::write("mst.dot", to_dot(&topology, &edges)) {
        eprintln!("DOT export failed: {e}");
        process::exit(1);
    }
    println!("Wrote mst.png and mst.dot");
}
