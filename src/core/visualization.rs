/*!
# Run Visualization

Renders a topology together with the spanning tree a run discovered:

- **Static Images**: PNG rendering via the plotters crate, with tree edges
  drawn heavier and colored.
- **Graphviz Export**: DOT output for tooling that prefers its own layout.

Layouts are deliberately simple. A circular layout reads well for the small
pedagogical topologies this crate targets, and the grid layout matches the grid
generator one-to-one.
*/

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

use crate::core::error::{FragmentaError, Result};
use crate::core::types::{MstEdge, NodeId, Topology};

/// Layout algorithms for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Nodes on a circle, in index order (default).
    #[default]
    Circular,
    /// Row-major grid of width `ceil(sqrt(n))`.
    Grid,
}

/// Configuration for rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    /// Layout algorithm to use
    pub layout: Layout,
    /// Node radius in pixels
    pub node_size: u32,
    /// Width of non-tree edges in pixels
    pub edge_width: u32,
    /// Whether to draw node indices
    pub show_labels: bool,
    /// Font size for labels
    pub font_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            layout: Layout::Circular,
            node_size: 10,
            edge_width: 2,
            show_labels: true,
            font_size: 14,
        }
    }
}

/// Computes node positions for the given layout inside a `width` x `height`
/// canvas, leaving a margin so node circles stay inside the image.
pub fn layout_positions(
    topology: &Topology,
    layout: Layout,
    width: f64,
    height: f64,
) -> HashMap<NodeId, (f64, f64)> {
    let nodes: Vec<NodeId> = topology.nodes().collect();
    let mut positions = HashMap::new();
    if nodes.is_empty() {
        return positions;
    }

    match layout {
        Layout::Circular => {
            let cx = width / 2.0;
            let cy = height / 2.0;
            let radius = (width.min(height) / 2.0) * 0.8;
            let count = nodes.len() as f64;
            for (i, node) in nodes.iter().enumerate() {
                let angle = std::f64::consts::TAU * (i as f64) / count;
                positions.insert(*node, (cx + radius * angle.cos(), cy + radius * angle.sin()));
            }
        }
        Layout::Grid => {
            let cols = (nodes.len() as f64).sqrt().ceil() as usize;
            let rows = nodes.len().div_ceil(cols);
            let cell_w = width / cols as f64;
            let cell_h = height / rows as f64;
            for (i, node) in nodes.iter().enumerate() {
                let (row, col) = (i / cols, i % cols);
                positions.insert(
                    *node,
                    ((col as f64 + 0.5) * cell_w, (row as f64 + 0.5) * cell_h),
                );
            }
        }
    }
    positions
}

fn tree_keys(mst: &[MstEdge]) -> HashSet<(usize, usize)> {
    mst.iter().map(|e| e.endpoints()).collect()
}

/// Renders the topology as a PNG image with the spanning tree highlighted.
pub fn render_png<P: AsRef<Path>>(
    topology: &Topology,
    mst: &[MstEdge],
    path: P,
    config: &RenderConfig,
) -> Result<()> {
    use plotters::prelude::*;

    let positions = layout_positions(
        topology,
        config.layout,
        config.width as f64,
        config.height as f64,
    );
    let tree = tree_keys(mst);

    let root =
        BitMapBackend::new(path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| FragmentaError::AlgorithmError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0.0..config.width as f64, 0.0..config.height as f64)
        .map_err(|e| FragmentaError::AlgorithmError(e.to_string()))?;

    // Plain edges below, tree edges on top.
    for pass in 0..2 {
        for (u, v, w) in topology.edges() {
            let key = MstEdge { u, v, weight: w }.endpoints();
            let in_tree = tree.contains(&key);
            if (pass == 0) == in_tree {
                continue;
            }
            if let (Some(&a), Some(&b)) = (positions.get(&u), positions.get(&v)) {
                let (color, stroke) = if in_tree {
                    (RGBColor(217, 95, 2), config.edge_width * 3)
                } else {
                    (RGBColor(150, 150, 150), config.edge_width)
                };
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![a, b],
                        ShapeStyle::from(&color).stroke_width(stroke),
                    )))
                    .map_err(|e| FragmentaError::AlgorithmError(e.to_string()))?;
            }
        }
    }

    for node in topology.nodes() {
        if let Some(&(x, y)) = positions.get(&node) {
            chart
                .draw_series(std::iter::once(Circle::new(
                    (x, y),
                    config.node_size as i32,
                    ShapeStyle::from(&RGBColor(105, 179, 162)).filled(),
                )))
                .map_err(|e| FragmentaError::AlgorithmError(e.to_string()))?;
            if config.show_labels {
                chart
                    .draw_series(std::iter::once(Text::new(
                        format!("{}", node.index()),
                        (x + config.node_size as f64 + 2.0, y),
                        ("sans-serif", config.font_size).into_font(),
                    )))
                    .map_err(|e| FragmentaError::AlgorithmError(e.to_string()))?;
            }
        }
    }

    root.present()
        .map_err(|e| FragmentaError::AlgorithmError(e.to_string()))?;
    Ok(())
}

/// Exports the topology to Graphviz DOT, with tree edges drawn bold and
/// colored. Edge labels carry the weights.
pub fn to_dot(topology: &Topology, mst: &[MstEdge]) -> String {
    let tree = tree_keys(mst);
    let mut out = String::from("graph mst {\n");
    let _ = writeln!(out, "    node [shape=circle];");
    for node in topology.nodes() {
        let _ = writeln!(out, "    {};", node.index());
    }
    for (u, v, w) in topology.edges() {
        let key = MstEdge { u, v, weight: w }.endpoints();
        let attrs = if tree.contains(&key) {
            format!("label=\"{}\", penwidth=3, color=\"#d95f02\"", w.0)
        } else {
            format!("label=\"{}\", color=\"#969696\"", w.0)
        };
        let _ = writeln!(out, "    {} -- {} [{}];", u.index(), v.index(), attrs);
    }
    out.push_str("}\n");
    out
}
