//! Corruption recovery tests for the trainlog binary.
//!
//! These tests verify the system can handle:
//! - Malformed CSV records
//! - Non-numeric cells
//! - Empty or header-only tables
//! - Duplicate session rows
//! - Renamed columns

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("trainlog"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir(temp_dir));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn data_dir(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("data")
}

fn write_table(dir: &Path, name: &str, contents: &[u8]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), contents).expect("Failed to write table");
}

fn dashboard_json(temp_dir: &TempDir) -> serde_json::Value {
    let output = cli(temp_dir)
        .args(["dashboard", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout is not JSON")
}

#[test]
fn test_malformed_record_is_skipped() {
    let temp_dir = setup_test_dir();
    write_table(
        &data_dir(&temp_dir),
        "strength.csv",
        b"session,squat_kg,squat_reps\n1,100,5\n2,\xff\xfe,5\n3,120,3\n",
    );

    let json = dashboard_json(&temp_dir);
    let sessions: Vec<u64> = json["loads"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["session"].as_u64().unwrap())
        .collect();
    assert_eq!(sessions, vec![1, 3]);
}

#[test]
fn test_non_numeric_cells_are_absent() {
    let temp_dir = setup_test_dir();
    write_table(
        &data_dir(&temp_dir),
        "strength.csv",
        b"session,squat_kg,squat_reps,bench_kg,bench_reps\n1,heavy,5,80,10\nabc,100,5,,\n",
    );

    let json = dashboard_json(&temp_dir);
    let loads = json["loads"].as_array().unwrap();
    // Squat contributes its reps only; the unkeyed row is dropped
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0]["load"], 805.0);
}

#[test]
fn test_comma_decimals_are_accepted() {
    let temp_dir = setup_test_dir();
    write_table(
        &data_dir(&temp_dir),
        "skill.csv",
        b"session,planche_sec\n1,\"12,5\"\n",
    );

    let json = dashboard_json(&temp_dir);
    assert_eq!(json["loads"][0]["load"], 12.5);
}

#[test]
fn test_empty_and_header_only_tables() {
    let temp_dir = setup_test_dir();
    write_table(&data_dir(&temp_dir), "strength.csv", b"");
    write_table(&data_dir(&temp_dir), "skill.csv", b"session,hspu_reps\n");

    cli(&temp_dir)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hybrid score: unavailable"));

    // Writing into an empty table recovers it
    cli(&temp_dir)
        .args(["strength", "--session", "1", "--set", "squat=100x5"])
        .assert()
        .success();
    let json = dashboard_json(&temp_dir);
    assert_eq!(json["loads"][0]["load"], 500.0);
}

#[test]
fn test_duplicate_session_rows_keep_last() {
    let temp_dir = setup_test_dir();
    write_table(
        &data_dir(&temp_dir),
        "strength.csv",
        b"session,bench_kg,bench_reps\n1,60,10\n1,80,10\n",
    );

    let json = dashboard_json(&temp_dir);
    let loads = json["loads"].as_array().unwrap();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0]["load"], 800.0);
}

#[test]
fn test_unknown_column_is_reported_not_fatal() {
    let temp_dir = setup_test_dir();
    write_table(
        &data_dir(&temp_dir),
        "skill.csv",
        b"session,handstand_pushups\n1,8\n",
    );

    cli(&temp_dir)
        .arg("dashboard")
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown column 'handstand_pushups'"));

    cli(&temp_dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning] skill"));
}

#[test]
fn test_lifestyle_readiness_recomputed_when_missing() {
    let temp_dir = setup_test_dir();
    write_table(
        &data_dir(&temp_dir),
        "lifestyle.csv",
        b"day,sleep,hydration,nutrition,stress,concentration,energy,mood,readiness\n\
          1,8,8,8,3,8,8,8,\n",
    );

    let json = dashboard_json(&temp_dir);
    assert_eq!(json["latest_readiness"], 77);
}
