//! Integration tests for the kindling binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("kindling.yml"), config).unwrap();
    temp
}

const SIMPLE_CONFIG: &str = r#"
toolchain:
  required_version: "1.0.0"
artifact:
  binary: cmt
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("provision a Rust toolchain"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("package"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_run_help_lists_flags() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.args(["run", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--required-version"))
        .stdout(predicate::str::contains("--register-repo"))
        .stdout(predicate::str::contains("--skip-build"))
        .stdout(predicate::str::contains("--dry-run"));
    Ok(())
}

#[test]
fn cli_unknown_package_format_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.args(["package", "msi"]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
    Ok(())
}

#[test]
fn cli_unknown_command_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.arg("unknown-command");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn cli_check_offline_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(SIMPLE_CONFIG);
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.current_dir(temp.path());
    cmd.args(["check", "--offline", "--json"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(json["required_version"], "1.0.0");
    assert_eq!(json["probe"]["repository"]["state"], "not_probed");
    assert!(json["decision"]["strategy"].is_string());
    Ok(())
}

#[test]
fn cli_check_human_readable() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(SIMPLE_CONFIG);
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.current_dir(temp.path());
    cmd.args(["check", "--offline"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Required:"))
        .stdout(predicate::str::contains("Decision:"));
    Ok(())
}

#[test]
fn cli_dry_run_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(SIMPLE_CONFIG);
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.current_dir(temp.path());
    cmd.args(["run", "--dry-run", "--offline"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("Summary"));
    assert!(!temp.path().join("target").exists());
    Ok(())
}

#[test]
fn cli_quiet_hides_messages_but_keeps_summary() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(SIMPLE_CONFIG);
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.current_dir(temp.path());
    cmd.args(["--quiet", "run", "--dry-run", "--offline"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Provisioning cmt").not())
        .stdout(predicate::str::contains("Would provision").not())
        .stdout(predicate::str::contains("Summary"));
    Ok(())
}

#[test]
fn cli_project_flag_selects_root() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(SIMPLE_CONFIG);
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.arg("--project").arg(temp.path());
    cmd.args(["run", "--dry-run", "--offline"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Provisioning cmt"));
    Ok(())
}

#[test]
fn cli_invalid_config_exits_nonzero() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("toolchain:\n  required_version: latest\n");
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.current_dir(temp.path());
    cmd.args(["check", "--offline"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("required_version"));
    Ok(())
}

#[test]
fn cli_missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.current_dir(temp.path());
    cmd.args(["--config", "nope.yml", "check", "--offline"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nope.yml"));
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("kindling"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("kindling"));
    Ok(())
}
