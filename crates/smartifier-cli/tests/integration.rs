//! End-to-end tests driving the smartifier2 binary on real files.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn smartifier() -> Command {
    Command::cargo_bin("smartifier2").expect("Failed to find smartifier2 binary")
}

#[test]
fn vertices_csv_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("v.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "_key,name,region\nalice,Alice,US\nbob,Bob,DE\n").unwrap();

    smartifier()
        .args([
            "vertices",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--smart-graph-attribute",
            "region",
            "--quiet",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "_key,name,region\nUS:alice,Alice,US\nDE:bob,Bob,DE\n"
    );
}

#[test]
fn vertices_jsonl_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("v.jsonl");
    let output = dir.path().join("out.jsonl");
    fs::write(&input, "{\"_key\":\"42\",\"name\":\"x\"}\n").unwrap();

    smartifier()
        .args([
            "vertices",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--smart-graph-attribute",
            "region",
            "--type",
            "jsonl",
            "--smart-default",
            "ZZ",
            "--quiet",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\"_key\":\"ZZ:42\",\"region\":\"ZZ\",\"name\":\"x\"}\n"
    );
}

#[test]
fn vertices_missing_input_reports_failure() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");

    smartifier()
        .args([
            "vertices",
            "--input",
            dir.path().join("nope.csv").to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--smart-graph-attribute",
            "region",
            "--quiet",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not open"));
}

#[test]
fn edges_csv_end_to_end() {
    let dir = TempDir::new().unwrap();
    let vertices = dir.path().join("v.csv");
    let edges = dir.path().join("e.csv");
    fs::write(&vertices, "_key,region\nUS:alice,US\nDE:bob,DE\n").unwrap();
    fs::write(&edges, "_key,_from,_to\ne1,profiles/alice,profiles/bob\n").unwrap();

    smartifier()
        .args([
            "edges",
            "--vertices",
            &format!("profiles:{}", vertices.display()),
            "--edges",
            &format!("{}:profiles:profiles", edges.display()),
            "--quiet",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&edges).unwrap(),
        "_key,_from,_to\nUS:e1:DE,profiles/US:alice,profiles/DE:bob\n"
    );
}

#[test]
fn edges_smart_index_end_to_end() {
    let dir = TempDir::new().unwrap();
    let edges = dir.path().join("e.csv");
    fs::write(&edges, "_from,_to\nprofiles/abcdef,profiles/ghijk\n").unwrap();

    smartifier()
        .args([
            "edges",
            "--edges",
            &format!("{}:profiles:profiles", edges.display()),
            "--smart-index",
            "2",
            "--quiet",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&edges).unwrap(),
        "_from,_to\nprofiles/ab:abcdef,profiles/gh:ghijk\n"
    );
}
