use std::path::PathBuf;

use pretty_assertions::assert_eq;
use panos_xml::{parse, parse_file, write, write_file};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parse_write_parse_round_trip_preserves_tree_shape() {
    let first = parse_file(&fixture("fixtures/panos-base.xml")).expect("initial parse");

    let written = write(&first).expect("write should succeed");
    let second = parse(&written).expect("re-parse should succeed");

    assert_eq!(first, second);
}

#[test]
fn write_file_replaces_existing_document() {
    let out_dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = out_dir.path().join("candidate.xml");
    std::fs::write(&out_path, "<config/>").expect("seed file");

    let node = parse_file(&fixture("fixtures/panos-ha.xml")).expect("parse should succeed");
    write_file(&node, &out_path).expect("write_file should succeed");

    let reparsed = parse_file(&out_path).expect("parse_file should succeed");
    assert_eq!(node, reparsed);
    assert!(!out_dir.path().join("candidate.xml.tmp").exists());
}
