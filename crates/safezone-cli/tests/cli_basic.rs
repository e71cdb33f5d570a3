//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temp dir so
//! config and contact storage start empty.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_safezone"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("SAFEZONE_ENV")
        .env("SAFEZONE_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("trigger"));
    assert!(stdout.contains("listen"));
}

#[test]
fn test_config_defaults() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "countdown.units"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (code, stdout, _) = run_cli(&home, &["config", "get", "detector.loud_threshold"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "80.0");
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "countdown.units", "5"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&home, &["config", "get", "countdown.units"]);
    assert_eq!(stdout.trim(), "5");

    let (code, _, _) = run_cli(&home, &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&home, &["config", "get", "countdown.units"]);
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_rejects_invalid_value() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "set", "countdown.units", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_unknown_key() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
}

#[test]
fn test_contact_set_and_show() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli(&home, &["contact", "set", "+15551234567"]);
    assert_eq!(code, 0, "contact set failed: {stderr}");
    let event: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(event["type"], "ContactSaved");
    assert!(stderr.contains("[Saved]"));

    let (code, stdout, _) = run_cli(&home, &["contact", "show"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "+15551234567");
}

#[test]
fn test_contact_set_blank_is_rejected() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["contact", "set", "   "]);
    assert_ne!(code, 0);
    assert!(stderr.contains("[Invalid Input]"));
}

#[test]
fn test_trigger_without_contact_fails() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli(
        &home,
        &["trigger", "--lat", "37.7749", "--lon", "-122.4194", "--dry-run"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("[Missing Contact]"));
    assert!(!stdout.contains("AlertSent"));
}

#[test]
fn test_trigger_dry_run_calls_after_countdown() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["contact", "set", "+15551234567"]);
    run_cli(&home, &["config", "set", "countdown.unit_ms", "10"]);

    let (code, stdout, stderr) = run_cli(
        &home,
        &["trigger", "--lat", "37.7749", "--lon", "-122.4194", "--dry-run"],
    );
    assert_eq!(code, 0, "trigger failed: {stderr}");
    assert!(stderr.contains("https://maps.google.com/?q=37.7749,-122.4194"));
    assert!(stderr.contains("dialing tel:+15551234567"));

    let types: Vec<String> = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("LocationAcquired"));
    assert!(types.contains(&"AlertSent".to_string()));
    assert_eq!(types.last().map(String::as_str), Some("EscalationStarted"));
    assert_eq!(types.iter().filter(|t| *t == "CountdownTicked").count(), 9);
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("safezone"));
}

#[test]
fn test_trigger_rejects_out_of_range_coordinate() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["contact", "set", "+15551234567"]);
    let (code, stdout, stderr) = run_cli(
        &home,
        &["trigger", "--lat", "123.0", "--lon", "0.0", "--dry-run"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("Location error: current position unavailable: invalid coordinate"));
    assert!(stdout.is_empty());
}

#[test]
fn test_contact_show_without_contact_fails() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli(&home, &["contact", "show"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("error:"));
}
