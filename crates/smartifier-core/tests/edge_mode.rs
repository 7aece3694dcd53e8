//! End-to-end tests for edge mode: vertex batches, endpoint resolution, and
//! in-place rewriting of edge files.

use std::fs;
use std::path::PathBuf;

use smartifier_core::{
    run_edges, DataType, DriverError, EdgeCollection, EdgeRunConfig, VertexFile,
};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn base_config(vertices: Vec<VertexFile>, edges: Vec<EdgeCollection>) -> EdgeRunConfig {
    EdgeRunConfig {
        vertices,
        edges,
        data_type: DataType::Csv,
        separator: ',',
        quote_char: '"',
        memory_limit: usize::MAX,
        smart_index: None,
        threads: 1,
    }
}

fn vertex_file(collection: &str, path: &PathBuf) -> VertexFile {
    VertexFile {
        collection: collection.to_string(),
        path: path.clone(),
    }
}

fn edge_coll(path: &PathBuf, from: &str, to: &str) -> EdgeCollection {
    EdgeCollection {
        file_name: path.clone(),
        from_vert_coll: from.to_string(),
        to_vert_coll: to.to_string(),
        column_renames: Vec::new(),
    }
}

#[test]
fn csv_endpoints_and_key_are_rewritten() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\nDE:bob\n");
    let e = write_file(
        &dir,
        "e.csv",
        "_key,_from,_to\ne1,profiles/alice,profiles/bob\n",
    );

    let config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "profiles")],
    );
    let stats = run_edges(config).unwrap();
    assert_eq!(stats.passes, 1);

    let out = fs::read_to_string(&e).unwrap();
    assert_eq!(
        out,
        "_key,_from,_to\nUS:e1:DE,profiles/US:alice,profiles/DE:bob\n"
    );
    // The temporary sibling is gone after the rename.
    assert!(!dir.path().join("e.csv.out").exists());
}

#[test]
fn csv_unresolved_endpoint_is_left_for_a_later_pass() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\n");
    let e = write_file(
        &dir,
        "e.csv",
        "_key,_from,_to\ne1,profiles/alice,profiles/charlie\n",
    );

    let config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "profiles")],
    );
    run_edges(config).unwrap();

    let out = fs::read_to_string(&e).unwrap();
    // _to unresolved, so _key stays as well.
    assert_eq!(
        out,
        "_key,_from,_to\ne1,profiles/US:alice,profiles/charlie\n"
    );
}

#[test]
fn csv_two_pass_batching_resolves_incrementally() {
    let dir = TempDir::new().unwrap();
    // A one-byte memory limit forces one vertex per batch.
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\nDE:charlie\n");
    let e = write_file(
        &dir,
        "e.csv",
        "_key,_from,_to\nx,profiles/alice,profiles/charlie\n",
    );

    let mut config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "profiles")],
    );
    config.memory_limit = 1;
    let stats = run_edges(config).unwrap();
    assert!(stats.passes >= 2, "expected multiple passes, got {}", stats.passes);

    let out = fs::read_to_string(&e).unwrap();
    assert_eq!(
        out,
        "_key,_from,_to\nUS:x:DE,profiles/US:alice,profiles/DE:charlie\n"
    );
}

#[test]
fn csv_edge_transform_reaches_a_fixpoint() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\nDE:bob\n");
    let e = write_file(
        &dir,
        "e.csv",
        "_key,_from,_to\ne1,profiles/alice,profiles/bob\ne2,alice,profiles/ghost\n",
    );

    let make_config = |v: &PathBuf, e: &PathBuf| {
        base_config(
            vec![vertex_file("profiles", v)],
            vec![edge_coll(e, "profiles", "profiles")],
        )
    };

    run_edges(make_config(&v, &e)).unwrap();
    let once = fs::read_to_string(&e).unwrap();
    run_edges(make_config(&v, &e)).unwrap();
    let twice = fs::read_to_string(&e).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn csv_default_collection_is_prepended() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\n");
    let e = write_file(&dir, "e.csv", "_from,_to\nalice,accounts/alice\n");

    let config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "accounts")],
    );
    run_edges(config).unwrap();

    let out = fs::read_to_string(&e).unwrap();
    // The bare endpoint gets the default collection; accounts/alice is not in
    // the table, so it stays as it is.
    assert_eq!(out, "_from,_to\nprofiles/US:alice,accounts/alice\n");
}

#[test]
fn csv_smart_index_without_vertex_files() {
    let dir = TempDir::new().unwrap();
    let e = write_file(&dir, "e.csv", "_from,_to\nprofiles/abcdef,profiles/xy\n");

    let mut config = base_config(Vec::new(), vec![edge_coll(&e, "profiles", "profiles")]);
    config.smart_index = Some(2);
    let stats = run_edges(config).unwrap();
    assert_eq!(stats.passes, 1);

    let out = fs::read_to_string(&e).unwrap();
    assert_eq!(out, "_from,_to\nprofiles/ab:abcdef,profiles/xy:xy\n");
}

#[test]
fn no_vertex_files_and_no_smart_index_is_an_error() {
    let dir = TempDir::new().unwrap();
    let e = write_file(&dir, "e.csv", "_from,_to\n");
    let config = base_config(Vec::new(), vec![edge_coll(&e, "p", "p")]);
    let err = run_edges(config).unwrap_err();
    assert!(matches!(err, DriverError::MissingVertexFiles));
}

#[test]
fn csv_missing_from_column_fails_that_file() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\n");
    let e = write_file(&dir, "e.csv", "_key,_to\ne1,profiles/alice\n");
    let original = fs::read_to_string(&e).unwrap();

    let config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "profiles")],
    );
    let err = run_edges(config).unwrap_err();
    assert!(matches!(err, DriverError::Edge(_)));
    // The original edge file is untouched.
    assert_eq!(fs::read_to_string(&e).unwrap(), original);
}

#[test]
fn csv_column_renames_apply_before_lookup() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\n");
    let e = write_file(&dir, "e.csv", "src,dst\nprofiles/alice,profiles/alice\n");

    let mut coll = edge_coll(&e, "profiles", "profiles");
    coll.column_renames = vec![(0, "_from".to_string()), (1, "_to".to_string())];
    let config = base_config(vec![vertex_file("profiles", &v)], vec![coll]);
    run_edges(config).unwrap();

    let out = fs::read_to_string(&e).unwrap();
    assert_eq!(
        out,
        "_from,_to\nprofiles/US:alice,profiles/US:alice\n"
    );
}

#[test]
fn multiple_edge_files_with_worker_pool() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.csv", "_key\nUS:alice\nDE:bob\n");
    let mut edge_paths = Vec::new();
    for i in 0..4 {
        edge_paths.push(write_file(
            &dir,
            &format!("e{i}.csv"),
            "_key,_from,_to\nk,profiles/alice,profiles/bob\n",
        ));
    }

    let mut config = base_config(
        vec![vertex_file("profiles", &v)],
        edge_paths
            .iter()
            .map(|p| edge_coll(p, "profiles", "profiles"))
            .collect(),
    );
    config.threads = 2;
    let stats = run_edges(config).unwrap();
    assert_eq!(stats.files, 4);

    for path in &edge_paths {
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "_key,_from,_to\nUS:k:DE,profiles/US:alice,profiles/DE:bob\n"
        );
    }
}

#[test]
fn jsonl_edges_end_to_end() {
    let dir = TempDir::new().unwrap();
    let v = write_file(
        &dir,
        "v.jsonl",
        "{\"_key\":\"US:alice\"}\n{\"_key\":\"DE:bob\"}\n",
    );
    let e = write_file(
        &dir,
        "e.jsonl",
        "{\"weight\":2,\"_from\":\"profiles/alice\",\"_to\":\"profiles/bob\",\"_key\":\"e1\"}\n",
    );

    let mut config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "profiles")],
    );
    config.data_type = DataType::Jsonl;
    run_edges(config).unwrap();

    let out = fs::read_to_string(&e).unwrap();
    assert_eq!(
        out,
        "{\"_key\":\"US:e1:DE\",\"_from\":\"profiles/US:alice\",\"_to\":\"profiles/DE:bob\",\"weight\":2}\n"
    );
}

#[test]
fn jsonl_unresolved_key_is_passed_through() {
    let dir = TempDir::new().unwrap();
    let v = write_file(&dir, "v.jsonl", "{\"_key\":\"US:alice\"}\n");
    let e = write_file(
        &dir,
        "e.jsonl",
        "{\"_key\":\"e1\",\"_from\":\"profiles/alice\",\"_to\":\"profiles/ghost\"}\n",
    );

    let mut config = base_config(
        vec![vertex_file("profiles", &v)],
        vec![edge_coll(&e, "profiles", "profiles")],
    );
    config.data_type = DataType::Jsonl;
    run_edges(config).unwrap();

    let out = fs::read_to_string(&e).unwrap();
    assert_eq!(
        out,
        "{\"_key\":\"e1\",\"_from\":\"profiles/US:alice\",\"_to\":\"profiles/ghost\"}\n"
    );
}
