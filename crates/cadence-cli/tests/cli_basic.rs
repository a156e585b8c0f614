//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own temporary data directory and
//! checks the JSON it prints.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_cadence-cli"))
        .env("CADENCE_DATA_DIR", data_dir)
        .env_remove("CADENCE_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn add_habit(data_dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["habit", "add"];
    full.extend_from_slice(args);
    let habit = run_json(data_dir, &full);
    habit["id"].as_str().unwrap().to_string()
}

#[test]
fn test_habit_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(
        dir.path(),
        &["Stretch", "--frequency", "weekly", "--days", "2,4"],
    );

    let habits = run_json(dir.path(), &["habit", "list"]);
    let habits = habits.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["id"], id.as_str());
    assert_eq!(habits[0]["frequency"], "weekly");
    assert_eq!(habits[0]["schedule"], "2 days per week");
    assert_eq!(habits[0]["target_labels"], serde_json::json!(["Mon", "Wed"]));
}

#[test]
fn test_habit_add_rejects_empty_weekly_rule() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["habit", "add", "Nothing", "--frequency", "weekly"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "unexpected stderr: {stderr}");
}

#[test]
fn test_done_toggles() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Water"]);

    let first = run_json(dir.path(), &["done", &id]);
    assert_eq!(first["completed"], true);
    assert_eq!(first["due"], true);

    let second = run_json(dir.path(), &["done", &id]);
    assert_eq!(second["completed"], false);
}

#[test]
fn test_stats_counts_today() {
    let dir = tempfile::tempdir().unwrap();
    let water = add_habit(dir.path(), &["Water"]);
    add_habit(dir.path(), &["Read"]);
    run_json(dir.path(), &["done", &water]);

    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["total_active"], 2);
    assert_eq!(stats["completed_today"], 1);
    assert_eq!(stats["current_streak"], 0);
    assert_eq!(stats["streak_label"], "0 days");
}

#[test]
fn test_archive_restores_streak() {
    let dir = tempfile::tempdir().unwrap();
    let water = add_habit(dir.path(), &["Water"]);
    let read = add_habit(dir.path(), &["Read"]);
    run_json(dir.path(), &["done", &water]);

    let (_, _, code) = run_cli(dir.path(), &["habit", "archive", &read]);
    assert_eq!(code, 0);

    // Days before the habits existed had nothing due.
    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["total_active"], 1);
    assert_eq!(stats["current_streak"], 365);
    assert_eq!(stats["milestone"], "year");

    let (_, _, code) = run_cli(
        dir.path(),
        &["config", "set", "streak.stop_at_history_start", "true"],
    );
    assert_eq!(code, 0);
    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["current_streak"], 1);
    assert_eq!(stats["streak_label"], "1 day");
}

#[test]
fn test_stats_at_earliest_date() {
    let dir = tempfile::tempdir().unwrap();
    let stats = run_json(dir.path(), &["stats", "--date=-262143-01-05"]);
    assert_eq!(stats["total_active"], 0);
    assert_eq!(stats["current_streak"], 0);
}

#[test]
fn test_invalid_edit_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Stretch"]);

    let (_, stderr, code) = run_cli(
        dir.path(),
        &["habit", "edit", &id, "--name", "Yoga", "--frequency", "weekly"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "unexpected stderr: {stderr}");

    let habit = run_json(dir.path(), &["habit", "get", &id]);
    assert_eq!(habit["name"], "Stretch");
    assert_eq!(habit["frequency"], "daily");
}

#[test]
fn test_due_reports_next_date() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Rent", "--frequency", "monthly", "--days", "31"]);

    // Backdated queries never report due dates before the habit existed.
    let due = run_json(dir.path(), &["due", &id, "--date", "2000-04-30"]);
    assert_eq!(due["due"], false);
    assert!(due["next_due"].is_string());
    assert_eq!(due["schedule"], "1 day per month");
}

#[test]
fn test_history_lists_requested_days() {
    let dir = tempfile::tempdir().unwrap();
    add_habit(dir.path(), &["Water"]);

    let history = run_json(dir.path(), &["history", "--days", "3"]);
    let days = history.as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["habits"].as_array().unwrap().len(), 1);
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "streak.max_days", "30"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "streak.max_days"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "30");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "streak.unknown", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("streak.unknown"));
}

#[test]
fn test_unknown_habit_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["done", "missing-id"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_completions_script() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("cadence-cli"));
}
