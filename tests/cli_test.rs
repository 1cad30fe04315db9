//! CLI end-to-end tests
//!
//! Tests for the pitwall command-line interface. None of them reach the
//! network: `run` is only exercised against an unreachable calendar.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the pitwall binary
#[allow(deprecated)]
fn pitwall_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pitwall").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    pitwall_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    pitwall_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pitwall"));
}

#[test]
fn test_cli_run_help() {
    pitwall_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mapped-folder"))
        .stdout(predicate::str::contains("--convert-to-jpg"));
}

#[test]
fn test_cli_classify_sprint_weekend() {
    pitwall_cmd()
        .args(["classify", "F1-s2024e05-SprintQuali.mkv", "F1-s2021e10-Sprint.mkv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sprint_qualifying\tsort key 4"))
        .stdout(predicate::str::contains("sprint\tsort key 6"));
}

#[test]
fn test_cli_classify_without_token() {
    pitwall_cmd()
        .args(["classify", "highlights.mkv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no season/episode token"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pitwall.toml");
    fs::write(
        &config_path,
        r#"
[library]
metadata_extension = ".nfo"

[ordering]
cutover_season = 2026

[circuit_aliases]
interlagos = "sao-paulo"
"#,
    )
    .unwrap();

    pitwall_cmd()
        .args(["validate", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Cutover season: 2026"))
        .stdout(predicate::str::contains("Metadata extension: .nfo"));
}

#[test]
fn test_cli_validate_invalid_pattern() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pitwall.toml");
    fs::write(&config_path, "[sessions]\nsprint = \"sprint(\"\n").unwrap();

    pitwall_cmd()
        .args(["validate", config_path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_cli_classify_uses_config_cutover() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pitwall.toml");
    fs::write(&config_path, "[ordering]\ncutover_season = 2026\n").unwrap();

    pitwall_cmd()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "classify",
            "F1-s2024e05-Sprint.mkv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("sort key 6"));
}

#[test]
fn test_cli_fixtures_and_clean() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("Formula 1");

    pitwall_cmd()
        .args(["fixtures", base.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    assert!(base.join("2021").is_dir());
    assert!(base.join("2024").is_dir());
    fs::write(base.join("2024/season.nfo"), "x").unwrap();

    pitwall_cmd()
        .args(["fixtures", "--clean", base.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1"));
    assert!(!base.join("2024/season.nfo").exists());
}

#[test]
fn test_cli_run_missing_base_folder() {
    pitwall_cmd()
        .args(["run", "/nonexistent/formula1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_run_fails_when_calendar_unreachable() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pitwall.toml");
    fs::write(
        &config_path,
        "[sources]\ncalendar_api = \"http://127.0.0.1:9/ergast/f1\"\n",
    )
    .unwrap();
    let base = dir.path().join("library");
    fs::create_dir(&base).unwrap();

    pitwall_cmd()
        .args(["--config", config_path.to_str().unwrap(), "run", base.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Calendar API is not usable"));
}
