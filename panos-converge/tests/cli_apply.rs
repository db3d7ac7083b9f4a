use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use panos_xml::{parse_file, XmlNode};
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

/// Copy a fixture into a fresh directory so runs can modify it.
fn staged(name: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("fw.xml");
    fs::copy(fixture(&format!("fixtures/{name}")), &path).expect("copy fixture");
    (dir, path)
}

fn apply(device: &Path, module: &str, sets: &[&str]) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("panos-converge"));
    cmd.arg("apply").arg(module).arg("--device").arg(device);
    for set in sets {
        cmd.arg("--set").arg(set);
    }
    cmd
}

fn gre_entry(config: &XmlNode, name: &str) -> Option<XmlNode> {
    config
        .descend(&["devices"])
        .and_then(|d| d.get_entry("localhost.localdomain"))
        .and_then(|d| d.descend(&["network", "tunnel", "gre"]))
        .and_then(|gre| gre.get_entry(name))
        .cloned()
}

fn lock_path(device: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", device.display()))
}

const SCENARIO_A: &[&str] = &[
    "name=myGreTunnel",
    "interface=ethernet1/5",
    "local_address_value=10.1.1.1/24",
    "peer_address=192.168.1.1",
    "tunnel_interface=tunnel.7",
    "ttl=42",
];

#[test]
fn creates_missing_tunnel_with_explicit_ttl() {
    let (_dir, device) = staged("panos-base.xml");

    apply(&device, "gre_tunnel", SCENARIO_A)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": true"))
        .stdout(predicate::str::contains("\"msg\": \"Done\""))
        .stdout(predicate::str::contains("<ttl>42</ttl>"));

    let config = parse_file(&device).expect("parse");
    let entry = gre_entry(&config, "myGreTunnel").expect("tunnel created");
    assert_eq!(entry.get_text(&["ttl"]), Some("42"));
    assert_eq!(entry.get_text(&["local-address", "type"]), Some("ip"));
    assert_eq!(entry.get_text(&["keep-alive", "interval"]), Some("10"));
    assert!(entry.get_child("copy-tos").is_none());
    assert!(gre_entry(&config, "existingGre").is_some());
    assert!(!lock_path(&device).exists());
}

#[test]
fn second_identical_apply_reports_no_change() {
    let (_dir, device) = staged("panos-base.xml");

    apply(&device, "gre_tunnel", SCENARIO_A).assert().success();
    let after_first = fs::read(&device).expect("read");

    apply(&device, "gre_tunnel", SCENARIO_A)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": false"));
    assert_eq!(fs::read(&device).expect("read"), after_first);
}

#[test]
fn absent_deletes_existing_tunnel_then_is_a_no_op() {
    let (_dir, device) = staged("panos-base.xml");

    apply(&device, "gre_tunnel", &["name=existingGre", "state=absent"])
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": true"));
    assert!(gre_entry(&parse_file(&device).expect("parse"), "existingGre").is_none());

    let before = fs::read(&device).expect("read");
    apply(&device, "gre_tunnel", &["name=existingGre", "state=absent"])
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": false"));
    assert_eq!(fs::read(&device).expect("read"), before);
}

#[test]
fn update_preserves_unmodeled_elements() {
    let (_dir, device) = staged("panos-base.xml");

    apply(
        &device,
        "gre_tunnel",
        &[
            "name=existingGre",
            "interface=ethernet1/5",
            "local_address_value=10.1.1.1/24",
            "peer_address=192.168.9.9",
            "tunnel_interface=tunnel.8",
            "ttl=10",
        ],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("GreTunnel[existingGre].ttl: 64 -> 10"));

    let entry = gre_entry(&parse_file(&device).expect("parse"), "existingGre").expect("entry");
    assert_eq!(entry.get_text(&["ttl"]), Some("10"));
    assert_eq!(entry.get_text(&["comment"]), Some("managed elsewhere"));
}

#[test]
fn check_mode_reports_change_without_writing() {
    let (_dir, device) = staged("panos-base.xml");
    let before = fs::read(&device).expect("read");

    apply(&device, "gre_tunnel", SCENARIO_A)
        .arg("--check")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": true"));

    assert_eq!(fs::read(&device).expect("read"), before);
}

#[test]
fn template_scope_creates_inside_template() {
    let (_dir, device) = staged("panos-base.xml");

    apply(&device, "gre_tunnel", &["name=branchGre", "template=branch"])
        .assert()
        .success();

    let raw = fs::read_to_string(&device).expect("read");
    let config = parse_file(&device).expect("parse");
    assert!(gre_entry(&config, "branchGre").is_none());
    assert!(raw.contains("<entry name=\"branchGre\">"));
}

#[test]
fn missing_template_fails_and_releases_lock() {
    let (_dir, device) = staged("panos-base.xml");
    let before = fs::read(&device).expect("read");

    apply(&device, "gre_tunnel", &["name=t1", "template=hq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed refresh"));

    assert!(!lock_path(&device).exists());
    assert_eq!(fs::read(&device).expect("read"), before);
}

#[test]
fn schema_errors_fail_before_touching_the_device() {
    let (_dir, device) = staged("panos-base.xml");
    let before = fs::read(&device).expect("read");

    apply(&device, "gre_tunnel", &["name=t1", "ttl=300"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be between 1 and 255"));
    apply(&device, "gre_tunnel", &["name=t1", "mtu=1400"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported parameter: mtu"));
    apply(&device, "gre_tunnel", &["ttl=64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required arguments: name"));

    assert_eq!(fs::read(&device).expect("read"), before);
}

#[test]
fn held_lock_is_a_session_error() {
    let (_dir, device) = staged("panos-base.xml");
    fs::write(lock_path(&device), "").expect("lock");

    apply(&device, "gre_tunnel", &["name=t1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
    assert!(lock_path(&device).exists());
}

#[test]
fn old_software_version_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let device = dir.path().join("old.xml");
    fs::write(
        &device,
        r#"<config version="8.1.0"><devices><entry name="localhost.localdomain"/></devices></config>"#,
    )
    .expect("write");

    apply(&device, "gre_tunnel", &["name=t1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires PAN-OS 9.0.0"));
}

#[test]
fn commit_writes_running_configuration() {
    let (dir, device) = staged("panos-base.xml");
    let running = dir.path().join("running.xml");

    apply(&device, "gre_tunnel", &["name=t1", "commit=true"])
        .arg("--running")
        .arg(&running)
        .assert()
        .success();

    let committed = parse_file(&running).expect("running written");
    assert!(gre_entry(&committed, "t1").is_some());
}

#[test]
fn commit_is_skipped_when_nothing_changed() {
    let (dir, device) = staged("panos-base.xml");

    apply(&device, "gre_tunnel", &["name=existingGre", "state=gathered"])
        .assert()
        .success();
    apply(&device, "gre_tunnel", &["name=missing", "state=absent", "commit=true"])
        .assert()
        .success();

    assert!(!dir.path().join("fw.running.xml").exists());
}

#[test]
fn refuses_running_path_equal_to_device() {
    let (_dir, device) = staged("panos-base.xml");

    apply(&device, "gre_tunnel", &["name=t1", "commit=true"])
        .arg("--running")
        .arg(&device)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to commit"));
}

#[test]
fn params_file_and_overrides_combine() {
    let (dir, device) = staged("panos-base.xml");
    let params = dir.path().join("gre.toml");
    fs::write(&params, "name = \"fromFile\"\nttl = 99\ncopy_tos = true\n").expect("write");

    apply(&device, "gre_tunnel", &["ttl=100"])
        .arg("--params")
        .arg(&params)
        .assert()
        .success();

    let entry = gre_entry(&parse_file(&device).expect("parse"), "fromFile").expect("entry");
    assert_eq!(entry.get_text(&["ttl"]), Some("100"));
    assert_eq!(entry.get_text(&["copy-tos"]), Some("yes"));
}

#[test]
fn gathered_filter_lists_matching_tunnels() {
    let (_dir, device) = staged("panos-base.xml");
    apply(&device, "gre_tunnel", &["name=hot", "ttl=200"]).assert().success();

    apply(
        &device,
        "gre_tunnel",
        &["state=gathered", "gathered_filter=ttl > 100"],
    )
    .arg("--format")
    .arg("json")
    .assert()
    .success()
    .stdout(predicate::str::contains("\"name\": \"hot\""))
    .stdout(predicate::str::contains("existingGre").not());
}

#[test]
fn ha_builds_only_children_with_options() {
    let (dir, device) = staged("panos-ha.xml");
    let params = dir.path().join("ha.json");
    fs::write(
        &params,
        r#"{"ha_peer_ip": "192.168.50.1", "ha1_port": "ethernet1/1", "ha2_port": "ethernet1/3"}"#,
    )
    .expect("write");

    apply(&device, "ha", &[])
        .arg("--params")
        .arg(&params)
        .assert()
        .success()
        .stdout(predicate::str::contains("- HighAvailability.ha1_backup"));

    let raw = fs::read_to_string(&device).expect("read");
    assert!(raw.contains("<port>ethernet1/1</port>"));
    assert!(!raw.contains("<ha1-backup>"));
    assert!(!raw.contains("<ip-address>192.168.50.2</ip-address>"));
    assert!(raw.contains("<device-priority>100</device-priority>"));
}

#[test]
fn ha_rejects_gre_only_states() {
    let (_dir, device) = staged("panos-ha.xml");

    apply(&device, "ha", &["state=merged"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported by ha"));
}
