use std::fs;

use fragmenta::core::ghs::ghs_mst;
use fragmenta::core::io::{mst_to_json, read_edge_list, write_edge_list};
use fragmenta::core::types::Topology;

#[test]
fn test_read_edge_list() {
    // Create a temporary edge list file that includes comments.
    let tmp_path = "tmp_fragmenta_edge_list.txt";
    let edge_list = "\
# This is a comment line and should be ignored
0,1,1.5
1,2,2.0
2,0,3.0  # Comment after data should be ignored
";
    fs::write(tmp_path, edge_list).expect("Unable to write temporary file");

    let topology = read_edge_list(tmp_path, ',').expect("read_edge_list failed");
    assert_eq!(topology.node_count(), 3);
    assert_eq!(topology.edge_count(), 3);

    fs::remove_file(tmp_path).expect("Failed to remove temporary file");
}

#[test]
fn test_missing_weight_column_is_rejected() {
    let tmp_path = "tmp_fragmenta_bad_edge_list.txt";
    fs::write(tmp_path, "0,1\n").expect("Unable to write temporary file");

    assert!(read_edge_list(tmp_path, ',').is_err());

    fs::remove_file(tmp_path).expect("Failed to remove temporary file");
}

#[test]
fn test_edge_list_round_trip() {
    let mut topology = Topology::new();
    let n0 = topology.add_node();
    let n1 = topology.add_node();
    let n2 = topology.add_node();
    topology.add_edge(n0, n1, 1.5);
    topology.add_edge(n1, n2, 2.0);
    topology.add_edge(n2, n0, 3.0);

    let tmp_path = "tmp_fragmenta_edge_list_out.txt";
    write_edge_list(tmp_path, &topology, ',').expect("write_edge_list failed");
    let reread = read_edge_list(tmp_path, ',').expect("read_edge_list failed");

    assert_eq!(reread.node_count(), 3);
    assert_eq!(reread.edge_count(), 3);
    let mut weights: Vec<f64> = reread.edges().map(|(_, _, w)| w.0).collect();
    weights.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(weights, vec![1.5, 2.0, 3.0]);

    fs::remove_file(tmp_path).expect("Failed to remove temporary file");
}

#[test]
fn test_loaded_topology_runs_end_to_end() {
    let tmp_path = "tmp_fragmenta_run_input.txt";
    fs::write(tmp_path, "0,1,1.0\n1,2,2.0\n0,2,3.0\n").expect("Unable to write temporary file");

    let topology = read_edge_list(tmp_path, ',').expect("read_edge_list failed");
    let (edges, total) = ghs_mst(&topology).expect("run failed");
    assert_eq!(edges.len(), 2);
    assert_eq!(total.0, 3.0);

    let json = mst_to_json(&edges, total).expect("export failed");
    assert!(json.contains("\"total_weight\": 3.0"));

    fs::remove_file(tmp_path).expect("Failed to remove temporary file");
}
