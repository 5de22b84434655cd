//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway config
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "physfocus-cli", "--"])
        .args(args)
        .env("PHYSFOCUS_CONFIG_DIR", config_dir)
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_list_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    assert!(stdout.contains("timer.focus_duration = 25"));
    assert!(stdout.contains("chat.api_key_env = GEMINI_API_KEY"));
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "timer.focus_duration", "50"]);
    assert_eq!(code, 0, "config set failed");
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.focus_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn test_config_set_rejects_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.short_break", "500"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.short_break"]);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_path_points_into_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
}

#[test]
fn test_timer_status_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "status", "--mode", "short-break"]);
    assert_eq!(code, 0, "timer status failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    assert_eq!(parsed["type"], "state_snapshot");
    assert_eq!(parsed["mode"], "short_break");
    assert_eq!(parsed["remaining_secs"], 300);
    assert_eq!(parsed["running"], false);
    assert_eq!(parsed["can_edit_settings"], true);
}

#[test]
fn test_timer_status_uses_configured_duration() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "timer.long_break", "20"]);
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "status", "--mode", "long"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["total_secs"], 1200);
}

#[test]
fn test_ask_without_key_reports_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["ask", "Formula", "for", "torque?"]);
    assert_ne!(code, 0);
    assert!(stdout.contains("not configured"), "stdout: {stdout}");
    assert!(stdout.contains("GEMINI_API_KEY"));
    assert!(stderr.contains("error:"));
}

#[test]
fn test_ask_json_without_key() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["ask", "--json", "What is g?"]);
    assert_ne!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("reply is JSON");
    assert_eq!(parsed["ok"], false);
    assert_eq!(parsed["sources"], serde_json::json!([]));
}

#[test]
fn test_study_reads_commands_until_eof() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new("cargo")
        .args(["run", "-q", "-p", "physfocus-cli", "--", "study"])
        .env("PHYSFOCUS_CONFIG_DIR", dir.path())
        .env_remove("GEMINI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"todo revise optics\ntodos\nmode long\nstatus\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("[ ] revise optics"));
    assert!(stdout.contains("[Long] 15:00"));
    assert!(stdout.contains("Focus time: 0h 0m"));
}
