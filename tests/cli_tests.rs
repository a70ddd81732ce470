//! The `fundarb` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn fundarb() -> Command {
    let mut cmd = Command::cargo_bin("fundarb").expect("binary built");
    cmd.arg("--color").arg("never");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn help_lists_subcommands() {
    fundarb()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("adapters"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn adapters_lists_every_venue() {
    fundarb()
        .arg("adapters")
        .assert()
        .success()
        .stdout(predicate::str::contains("lighter"))
        .stdout(predicate::str::contains("ParaDex"))
        .stdout(predicate::str::contains("hyperliquid"));
}

#[test]
fn adapters_json_is_one_object_per_line() {
    let output = fundarb().args(["--json", "adapters"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["type"], "adapter");
    assert_eq!(lines[0]["payload"]["id"], "lighter");
    assert_eq!(lines[4]["payload"]["enabled"], false);
}

#[test]
fn check_config_accepts_valid_file() {
    let file = config_file("[monitor]\nrefresh_interval_secs = 10\n");
    fundarb()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"));
}

#[test]
fn check_config_warns_on_nonstandard_interval() {
    let file = config_file("[monitor]\nrefresh_interval_secs = 45\n");
    fundarb()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("not one of"));
}

#[test]
fn check_config_rejects_floor_below_two() {
    let file = config_file("[monitor]\nmin_enabled = 1\n");
    fundarb()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for min_enabled"));
}

#[test]
fn check_config_reports_missing_file() {
    fundarb()
        .args(["check", "config", "--config", "/nonexistent/fundarb.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn run_rejects_single_adapter_selection() {
    fundarb()
        .args(["run", "--config", "/nonexistent/fundarb.toml"])
        .assert()
        .failure();

    let file = config_file("");
    fundarb()
        .args(["run", "--enable", "lighter", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 required"));
}
