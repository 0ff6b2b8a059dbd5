//! Error scenario integration tests

use std::process::Command;

fn trivox_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_trivox"));
    // Isolate from the developer's real environment and config file
    cmd.env_remove("TRIVOX_ENDPOINT")
        .env_remove("TRIVOX_TASK_ID")
        .env("HOME", "/nonexistent")
        .env("XDG_CONFIG_HOME", "/nonexistent");
    cmd
}

#[test]
fn missing_endpoint_error() {
    let output = trivox_bin().output().expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("endpoint"),
        "Expected error about missing endpoint, got: {}",
        stderr
    );
}

#[test]
fn missing_task_id_error() {
    let output = trivox_bin()
        .args(["--endpoint", "https://store.example/upload"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("task"),
        "Expected error about missing task id, got: {}",
        stderr
    );
}

#[test]
fn invalid_max_duration_error() {
    let output = trivox_bin()
        .args([
            "--endpoint",
            "https://store.example/upload",
            "--task-id",
            "task-1",
            "--max-duration",
            "invalid",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid") || stderr.contains("invalid"),
        "Expected error about invalid max-duration, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let output = trivox_bin()
        .args(["config", "set", "unknown_key", "value"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_get_unknown_key() {
    let output = trivox_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_duration() {
    let output = trivox_bin()
        .args(["config", "set", "max_duration", "invalid"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid") || stderr.contains("invalid") || stderr.contains("duration"),
        "Expected error about invalid duration, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_debounce() {
    let output = trivox_bin()
        .args(["config", "set", "debounce_ms", "soon"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("milliseconds"),
        "Expected error about invalid debounce, got: {}",
        stderr
    );
}
