/*!
# Input/Output (I/O) Routines

This module provides functions to read from and write to files containing
topology representations, plus a JSON export for finished runs:

- **Edge List I/O:**
  - Reading a weighted edge list from a file into a [`Topology`].
  - Writing a topology's edge list to a file.

- **Result Export:**
  - Serializing an MST edge set to JSON for downstream tooling.

Input files support comments (lines or inline comments beginning with `#` are
ignored). Unlike generic edge-list formats, the weight column is mandatory:
a distributed run needs distinct weights, so silently defaulting them would
only delay the error.
*/

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FragmentaError, Result};
use crate::core::types::{MstEdge, NodeId, Topology, Weight};

/// Reads a weighted edge list from a file into a new topology.
///
/// Each non-comment, non-empty line must contain three tokens separated by
/// `sep`: source index, target index, and weight. Node indices may appear in
/// any order; nodes are created densely in order of first appearance.
///
/// # Arguments
///
/// * `path` - Path to the edge list file.
/// * `sep` - The character separating the values in the edge list.
///
/// # Example
///
/// ```rust,no_run
/// use fragmenta::core::io::read_edge_list;
///
/// let topology = read_edge_list("edges.txt", ',').expect("Failed to read edge list");
/// ```
pub fn read_edge_list<P: AsRef<Path>>(path: P, sep: char) -> Result<Topology> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut topology = Topology::new();
    let mut node_map: HashMap<usize, NodeId> = HashMap::new();

    for line in reader.lines() {
        let mut line = line?;
        if let Some(idx) = line.find('#') {
            line.truncate(idx);
        }
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.trim().split(sep).map(|s| s.trim()).collect();
        if tokens.len() < 3 {
            return Err(FragmentaError::invalid_argument(format!(
                "Expected 'source{sep}target{sep}weight', got '{}'",
                line.trim()
            )));
        }
        let src: usize = tokens[0].parse().map_err(|e| {
            FragmentaError::invalid_argument(format!(
                "Error parsing source value '{}': {}",
                tokens[0], e
            ))
        })?;
        let tgt: usize = tokens[1].parse().map_err(|e| {
            FragmentaError::invalid_argument(format!(
                "Error parsing target value '{}': {}",
                tokens[1], e
            ))
        })?;
        let weight: f64 = tokens[2].parse().map_err(|e| {
            FragmentaError::invalid_argument(format!(
                "Error parsing weight '{}': {}",
                tokens[2], e
            ))
        })?;
        let src_node = *node_map.entry(src).or_insert_with(|| topology.add_node());
        let tgt_node = *node_map.entry(tgt).or_insert_with(|| topology.add_node());
        topology.add_edge(src_node, tgt_node, weight);
    }
    Ok(topology)
}

/// Writes the edge list of a topology to a file.
///
/// Each line contains the source index, target index, and weight, separated by
/// `sep`.
pub fn write_edge_list<P: AsRef<Path>>(path: P, topology: &Topology, sep: char) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (u, v, w) in topology.edges() {
        writeln!(writer, "{}{sep}{}{sep}{}", u.index(), v.index(), w.0)?;
    }
    writer.flush()?;
    Ok(())
}

/// JSON record for one spanning tree edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MstEdgeRecord {
    pub u: usize,
    pub v: usize,
    pub weight: f64,
}

/// JSON document describing a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MstDocument {
    pub edges: Vec<MstEdgeRecord>,
    pub total_weight: f64,
}

/// Serializes an MST edge set to pretty-printed JSON.
pub fn mst_to_json(edges: &[MstEdge], total_weight: Weight) -> Result<String> {
    let document = MstDocument {
        edges: edges
            .iter()
            .map(|e| {
                let (u, v) = e.endpoints();
                MstEdgeRecord {
                    u,
                    v,
                    weight: e.weight.0,
                }
            })
            .collect(),
        total_weight: total_weight.0,
    };
    serde_json::to_string_pretty(&document).map_err(FragmentaError::from)
}
