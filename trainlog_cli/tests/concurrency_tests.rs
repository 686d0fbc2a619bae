//! Concurrency tests for the trainlog binary.
//!
//! These tests verify that multiple processes can safely:
//! - Upsert different sessions into the same table (file locking)
//! - Upsert the same session without duplicating its row
//! - Read while others write

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

fn cli(temp_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("trainlog"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.join("config"))
        .arg("--data-dir")
        .arg(temp_dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn strength_rows(root: &Path) -> Vec<String> {
    let content =
        fs::read_to_string(root.join("data").join("strength.csv")).expect("Failed to read table");
    content
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect()
}

#[test]
fn test_concurrent_distinct_sessions() {
    let temp_dir = setup_test_dir();
    let root: PathBuf = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (1..=8)
        .map(|session| {
            let root = root.clone();
            thread::spawn(move || {
                cli(&root)
                    .args(["strength", "--session", session.to_string().as_str()])
                    .args(["--set", format!("squat={}x5", 60 + session * 5).as_str()])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let rows = strength_rows(&root);
    assert_eq!(rows.len(), 8, "Expected 8 sessions, got {:?}", rows);
}

#[test]
fn test_concurrent_same_session_merges() {
    let temp_dir = setup_test_dir();
    let root: PathBuf = temp_dir.path().to_path_buf();

    // Create the row first so every writer takes the update path
    cli(&root)
        .args(["strength", "--session", "1", "--set", "squat=100x5"])
        .assert()
        .success();

    let sets = ["bench=80x8", "deadlift=140x3", "ohp=50x6", "row=70x10"];
    let handles: Vec<_> = sets
        .iter()
        .map(|set| {
            let root = root.clone();
            let set = set.to_string();
            thread::spawn(move || {
                cli(&root)
                    .args(["strength", "--session", "1", "--set", set.as_str()])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let rows = strength_rows(&root);
    assert_eq!(rows.len(), 1, "Session 1 was duplicated: {:?}", rows);

    let json = cli(&root)
        .args(["dashboard", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let dashboard: serde_json::Value = serde_json::from_slice(&json).unwrap();
    // 500 + 640 + 420 + 300 + 700
    assert_eq!(dashboard["loads"][0]["load"], 2560.0);
}

#[test]
fn test_reads_during_writes() {
    let temp_dir = setup_test_dir();
    let root: PathBuf = temp_dir.path().to_path_buf();

    cli(&root)
        .args(["strength", "--session", "1", "--set", "squat=100x5"])
        .assert()
        .success();

    let writer_root = root.clone();
    let writer = thread::spawn(move || {
        for session in 2..=6 {
            cli(&writer_root)
                .args(["strength", "--session", session.to_string().as_str(), "--set", "bench=80x5"])
                .assert()
                .success();
        }
    });

    for _ in 0..5 {
        cli(&root).arg("dashboard").assert().success();
    }

    writer.join().expect("writer thread panicked");
    assert_eq!(strength_rows(&root).len(), 6);
}
