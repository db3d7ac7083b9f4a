use assert_cmd::Command;
use predicates::prelude::*;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("panos-converge"))
}

#[test]
fn modules_lists_registered_modules() {
    bin()
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("gre_tunnel"))
        .stdout(predicate::str::contains("present|absent|merged|replaced|deleted|gathered"))
        .stdout(predicate::str::contains("ha"));
}

#[test]
fn modules_audit_passes() {
    bin()
        .arg("modules")
        .arg("--audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit gre_tunnel: ok"))
        .stdout(predicate::str::contains("audit ha: ok"));
}

#[test]
fn describe_shows_defaults_and_choices() {
    bin()
        .arg("describe")
        .arg("ha")
        .assert()
        .success()
        .stdout(predicate::str::contains("- ha2_port (str) default=ha2-a"))
        .stdout(predicate::str::contains("- ha_device_id (int) choices=0|1"))
        .stdout(predicate::str::contains("- template_stack (str)"))
        .stdout(predicate::str::contains("gathered_filter").not());
}

#[test]
fn describe_accepts_dashed_names() {
    bin()
        .arg("describe")
        .arg("gre-tunnel")
        .assert()
        .success()
        .stdout(predicate::str::contains("requires PAN-OS 9.0.0 or newer"));
}

#[test]
fn unknown_module_fails() {
    bin()
        .arg("describe")
        .arg("vlan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown module 'vlan'"));
}
