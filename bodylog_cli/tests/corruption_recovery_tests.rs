//! Corruption recovery tests for the bodylog binary.
//!
//! These tests verify the system can handle:
//! - Empty and whitespace-only log files
//! - Partial rows left by an interrupted write
//! - Files that are not measurement logs
//! - Broken configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("config.toml"), "").expect("Failed to write config");
    temp_dir
}

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bodylog").expect("Failed to find bodylog binary");
    cmd.arg("--data-dir")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

#[test]
fn test_whitespace_only_log_is_treated_as_empty() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("weight_log.csv");
    fs::write(&log_path, "\n   \n").unwrap();

    cli(temp_dir.path())
        .args(["add", "--weight", "70", "--waist", "85", "--neck", "35", "--date", "2024-03-01"])
        .assert()
        .success();

    let content = fs::read_to_string(&log_path).unwrap();
    assert_eq!(
        content,
        "date,weight,waist,neck,fat_pct\n2024-03-01,70.0,85.0,35.0,18.80\n"
    );
}

#[test]
fn test_empty_log_has_no_defaults() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("weight_log.csv"), "").unwrap();

    // Nothing to carry forward from
    cli(temp_dir.path())
        .args(["add", "--weight", "70"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid measurement"));
}

#[test]
fn test_partial_row_is_skipped_and_next_append_repairs() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("weight_log.csv");
    fs::write(
        &log_path,
        "date,weight,waist,neck,fat_pct\n2024-03-01,70.0,85.0,35.0,18.80\n2024-03-02,7",
    )
    .unwrap();

    // The torn row is ignored, so the next date follows 2024-03-01
    cli(temp_dir.path())
        .args(["add", "--weight", "71"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry saved for 2024-03-02"));

    let output = cli(temp_dir.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let records: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 2);
}

#[test]
fn test_foreign_file_is_not_overwritten() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("weight_log.csv");
    fs::write(&log_path, "name,score\nalice,3\n").unwrap();

    cli(temp_dir.path())
        .args(["add", "--weight", "70", "--waist", "85", "--neck", "35"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt measurement log"));

    assert_eq!(
        fs::read_to_string(&log_path).unwrap(),
        "name,score\nalice,3\n"
    );
}

#[test]
fn test_menu_survives_corrupt_log() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("weight_log.csv"), "name,score\n").unwrap();

    cli(temp_dir.path())
        .arg("menu")
        .write_stdin("2\n1\n4\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error reading log"))
        .stdout(predicate::str::contains("Error saving entry: Corrupt measurement log"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn test_delete_on_missing_log() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["delete", "2024-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entry found for 2024-03-01."));

    assert!(!temp_dir.path().join("weight_log.csv").exists());
}

#[test]
fn test_corrupted_config_file() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("config.toml"), "[body\nheight_cm =").unwrap();

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_invalid_height_in_config() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[body]\nheight_cm = -5.0\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("height_cm must be a positive number"));
}
