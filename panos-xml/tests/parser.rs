use std::path::PathBuf;

use panos_xml::{parse_file, XmlPath};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_root_attributes_and_entries() {
    let node = parse_file(&fixture("fixtures/panos-base.xml")).expect("parse should succeed");
    assert_eq!(node.tag, "config");
    assert_eq!(node.attributes.get("version"), Some(&"10.1.0".to_string()));

    let devices = node.get_child("devices").expect("devices should exist");
    let device = devices
        .get_entry("localhost.localdomain")
        .expect("device entry should exist");
    assert!(device.get_child("network").is_some());
}

#[test]
fn resolves_gre_container_inside_template() {
    let node = parse_file(&fixture("fixtures/panos-base.xml")).expect("parse should succeed");
    let path = XmlPath::root("config")
        .tag("devices")
        .entry("localhost.localdomain")
        .tag("template")
        .entry("branch")
        .tag("config")
        .tag("devices")
        .entry("localhost.localdomain")
        .join(&["network", "tunnel", "gre"]);

    let gre = path.resolve(&node).expect("template gre container");
    assert_eq!(gre.entries().count(), 0);
}

#[test]
fn reads_nested_singleton_text() {
    let node = parse_file(&fixture("fixtures/panos-ha.xml")).expect("parse should succeed");
    let ha = XmlPath::root("config")
        .tag("devices")
        .entry("localhost.localdomain")
        .join(&["deviceconfig", "high-availability"])
        .resolve(&node)
        .expect("ha element");

    assert_eq!(ha.get_text(&["group", "peer-ip"]), Some("192.168.50.1"));
    assert_eq!(ha.get_text(&["interface", "ha1", "port"]), Some("ethernet1/1"));
}
