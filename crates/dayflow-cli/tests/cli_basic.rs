//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against an isolated data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against `dir` and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "dayflow-cli", "--"])
        .args(args)
        .env("DAYFLOW_DATA_DIR", dir)
        .output()
        .expect("failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn help_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _stderr, code) = run_cli(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Dayflow CLI"));
}

#[test]
fn activity_add_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["activity", "add", "Reading"]);
    assert_eq!(code, 0, "activity add failed: {stderr}");
    assert!(stdout.contains("Activity created: Reading"));

    let (stdout, _stderr, code) = run_cli(dir.path(), &["activity", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Reading"));
}

#[test]
fn timer_status_is_idle_on_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _stderr, code) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).expect("status JSON");
    assert_eq!(status["state"], "idle");
    assert_eq!(status["elapsed_secs"], 0);
}

#[test]
fn timer_start_persists_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["activity", "add", "Coding"]);
    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "start", "1"]);
    assert_eq!(code, 0, "timer start failed: {stderr}");
    assert!(stdout.contains("session 1 started"));

    let (stdout, _stderr, code) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).expect("status JSON");
    assert_eq!(status["state"], "running");
    assert_eq!(status["activity_id"], 1);

    // A second start is rejected while the session is live.
    let (_stdout, stderr, code) = run_cli(dir.path(), &["timer", "start", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already active"));

    let (stdout, _stderr, code) = run_cli(dir.path(), &["timer", "stop"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("session 1 stopped"));
}

#[test]
fn timetable_add_and_schedule_show() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["activity", "add", "Coding"]);
    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["timetable", "add", "09:00", "10:00", "--activity", "1"],
    );
    assert_eq!(code, 0, "timetable add failed: {stderr}");
    assert!(stdout.contains("Slot added: 09:00-10:00"));

    let (stdout, _stderr, code) = run_cli(dir.path(), &["schedule", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("start"));
    assert!(stdout.contains("end"));
    assert!(stdout.contains("Coding"));
}

#[test]
fn timetable_rejects_malformed_times() {
    let dir = tempfile::tempdir().unwrap();
    let (_stdout, stderr, code) = run_cli(dir.path(), &["timetable", "add", "9am", "10:00"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid start time"));
}

#[test]
fn dnd_toggle_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _stderr, code) = run_cli(dir.path(), &["dnd", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("off"));

    run_cli(dir.path(), &["dnd", "on"]);
    let (stdout, _stderr, _code) = run_cli(dir.path(), &["dnd", "status"]);
    assert!(stdout.contains("on"));

    run_cli(dir.path(), &["dnd", "off"]);
    let (stdout, _stderr, _code) = run_cli(dir.path(), &["dnd", "status"]);
    assert!(stdout.contains("off"));
}

#[test]
fn stats_summary_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _stderr, code) = run_cli(dir.path(), &["stats", "summary", "--json"]);
    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(&stdout).expect("summary JSON");
    assert_eq!(summary["tracked_secs"], 0);
    assert_eq!(summary["sessions"], 0);
}
