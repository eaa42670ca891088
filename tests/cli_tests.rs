//! End-to-end tests for the `timerlog` binary

#![allow(deprecated)] // Command::cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn timerlog() -> Command {
    Command::cargo_bin("timerlog").unwrap()
}

// ============================================================================
// emit + report
// ============================================================================

#[test]
fn test_emit_then_report_text() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("run.tlog");

    timerlog()
        .arg("emit")
        .arg("--log")
        .arg(&log)
        .args(["start:compile", "end:compile", "start:link", "end:link"])
        .assert()
        .success();

    // 4 events, each name + NUL + tag + 8 byte timestamp
    assert_eq!(fs::read(&log).unwrap().len(), 2 * (7 + 10) + 2 * (4 + 10));

    timerlog()
        .arg("report")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("link"))
        .stdout(predicate::str::contains("total"));
}

#[test]
fn test_report_merges_files_and_outputs_json() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.tlog");
    let second = dir.path().join("second.tlog");

    timerlog()
        .args(["emit", "--log"])
        .arg(&first)
        .arg("start:job")
        .assert()
        .success();
    timerlog()
        .args(["emit", "--log"])
        .arg(&second)
        .arg("end:job")
        .assert()
        .success();

    let output = timerlog()
        .args(["report", "--format", "json"])
        .arg(&first)
        .arg(&second)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["timers"][0]["name"], "job");
    assert_eq!(value["timers"][0]["count"], 1);
    assert!(value["anomalies"].as_array().unwrap().is_empty());
}

#[test]
fn test_report_lists_excluded_timers() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("run.tlog");

    timerlog()
        .args(["emit", "--log"])
        .arg(&log)
        .args(["start:ok", "end:ok", "start:dangling"])
        .assert()
        .success();

    timerlog()
        .arg("report")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Excluded timers:"))
        .stdout(predicate::str::contains(
            "Timer dangling was started but never ended",
        ))
        .stderr(predicate::str::contains("dangling"));

    timerlog()
        .args(["report", "--strict"])
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 timer(s) excluded"));
}

#[test]
fn test_report_corrupt_log_fails() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("bad.tlog");
    fs::write(&log, b"job\0s\x01\x02\x03").unwrap();

    timerlog()
        .arg("report")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt timer data"));
}

#[test]
fn test_report_missing_log_fails() {
    let dir = TempDir::new().unwrap();
    timerlog()
        .arg("report")
        .arg(dir.path().join("missing.tlog"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.tlog"));
}

#[test]
fn test_emit_rejects_malformed_event() {
    let dir = TempDir::new().unwrap();
    timerlog()
        .args(["emit", "--log"])
        .arg(dir.path().join("run.tlog"))
        .arg("begin:job")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected start:NAME or end:NAME"));
}

#[test]
fn test_report_format_from_config() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("run.tlog");
    let config = dir.path().join("timerlog.toml");
    fs::write(&config, "format = \"json\"\n").unwrap();

    timerlog()
        .args(["emit", "--log"])
        .arg(&log)
        .args(["start:a", "end:a"])
        .assert()
        .success();

    timerlog()
        .arg("--config")
        .arg(&config)
        .arg("report")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

// ============================================================================
// per-file timers
// ============================================================================

#[test]
fn test_file_timer_lifecycle() {
    let dir = TempDir::new().unwrap();
    let timers = dir.path();

    timerlog()
        .args(["delta", "build", "--dir"])
        .arg(timers)
        .assert()
        .success()
        .stdout("never started\n");

    timerlog()
        .args(["start", "build", "--dir"])
        .arg(timers)
        .assert()
        .success();
    assert!(timers.join("build_start").exists());

    timerlog()
        .args(["delta", "build", "--dir"])
        .arg(timers)
        .assert()
        .success()
        .stdout("never ended\n");

    timerlog()
        .args(["poll", "build", "--dir"])
        .arg(timers)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d+\n$").unwrap());

    timerlog()
        .args(["end", "build", "--dir"])
        .arg(timers)
        .assert()
        .success();

    timerlog()
        .args(["delta", "build", "--dir"])
        .arg(timers)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d+\n$").unwrap());

    timerlog()
        .args(["delete", "build", "--dir"])
        .arg(timers)
        .assert()
        .success();
    assert!(!timers.join("build_start").exists());
    assert!(!timers.join("build_end").exists());

    timerlog()
        .args(["delete", "build", "--dir"])
        .arg(timers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not running"));

    timerlog()
        .args(["delete", "build", "--if-exists", "--dir"])
        .arg(timers)
        .assert()
        .success();
}

#[test]
fn test_file_timer_dir_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("timerlog.toml");
    fs::write(
        &config,
        format!("timer_dir = {:?}\n", dir.path().display().to_string()),
    )
    .unwrap();

    timerlog()
        .arg("--config")
        .arg(&config)
        .args(["start", "deploy"])
        .assert()
        .success();
    assert!(dir.path().join("deploy_start").exists());
}

#[test]
fn test_file_timer_requires_directory() {
    timerlog()
        .args(["start", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No timer directory"));
}

#[test]
fn test_file_timer_invalid_directory() {
    let dir = TempDir::new().unwrap();
    timerlog()
        .args(["start", "deploy", "--dir"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timer directory"));
}
