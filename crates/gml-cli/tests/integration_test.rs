//! End-to-end tests for the `gml` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

const TWO_GRAPHS: &str = r#"graph [
  label "g1"
  node [ id 1 ]
  node [ id 2 ]
  edge [ source 1 target 2 ]
]
graph [
  label "g2"
  node [ id 1 ]
]
"#;

fn gml(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gml"))
        .args(args)
        .output()
        .expect("run gml binary")
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write input file");
    path
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn parse_prints_summary_counts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), "two.gml", TWO_GRAPHS);

    let output = gml(&["parse", input.to_str().expect("utf-8 path")]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let summary = stdout_json(&output);
    assert_eq!(summary["graph_count"], 2);
    assert_eq!(summary["vertex_count"], 3);
    assert_eq!(summary["edge_count"], 1);
    assert_eq!(summary["graphs"][1]["vertex_count"], 1);
}

#[test]
fn parse_full_emits_attribute_bundles() {
    let output = gml(&["parse", "--full", r#"graph [ label "g" node [ id 1 v 2.5 ] ]"#]);
    assert!(output.status.success());

    let graphs = stdout_json(&output);
    assert_eq!(graphs[0]["attributes"]["label"], "g");
    assert_eq!(graphs[0]["vertices"][0]["attributes"]["id"], 1);
    assert_eq!(graphs[0]["vertices"][0]["attributes"]["v"], 2.5);
}

#[test]
fn parse_fails_on_duplicate_id() {
    let output = gml(&["parse", "graph [ node [ id 1 ] node [ id 1 ] ]"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("node id 1 already exists"), "stderr: {stderr}");
}

#[test]
fn validate_reports_error_location_as_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(
        dir.path(),
        "broken.gml",
        "graph [\n  node [ id 1 ]\n  edge [ source 1 ]\n]\n",
    );

    let output = gml(&["validate", "--json", input.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));

    let report = stdout_json(&output);
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"][0]["code"], "gml/error/incomplete-edge");
    assert_eq!(report["errors"][0]["line"], 3);
}

#[test]
fn validate_accepts_well_formed_input() {
    let output = gml(&["validate", "--json", TWO_GRAPHS]);
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["valid"], true);
    assert_eq!(report["graph_count"], 2);
    assert!(report["errors"].as_array().expect("errors array").is_empty());
}

#[test]
fn config_file_limits_input_size() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_input(dir.path(), "options.json", r#"{ "max_input_bytes": 4 }"#);

    let output = gml(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "validate",
        "--json",
        "graph [ ]",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let report = stdout_json(&output);
    assert_eq!(report["errors"][0]["code"], "gml/error/input-too-large");
}

#[test]
fn unknown_config_field_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_input(dir.path(), "options.json", r#"{ "max_nodes": 4 }"#);

    let output = gml(&["--config", config.to_str().expect("utf-8 path"), "parse", "graph [ ]"]);
    assert!(!output.status.success());
}
