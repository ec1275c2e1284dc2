//! Tests for main.rs startup validation (JWT_SECRET, CLI arguments).

use std::process::{Command, Stdio};

fn cargo_bin() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_roombook"))
}

fn combined_output(output: &std::process::Output) -> String {
    // tracing logs to stdout by default
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_missing_jwt_secret_exits_with_error() {
    let output = Command::new(cargo_bin())
        .env_remove("JWT_SECRET")
        .args(["--database", ":memory:"])
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .expect("Failed to run binary");

    assert!(
        !output.status.success(),
        "Should exit with error when JWT_SECRET is missing"
    );

    let combined = combined_output(&output);
    assert!(
        combined.contains("JWT_SECRET") && combined.contains("required"),
        "Should mention JWT_SECRET is required, got: {}",
        combined
    );
}

#[test]
fn test_short_jwt_secret_exits_with_error() {
    let output = Command::new(cargo_bin())
        .env("JWT_SECRET", "too-short")
        .args(["--database", ":memory:"])
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(
        combined.contains("shorter than 32"),
        "Should mention the minimum length, got: {}",
        combined
    );
}

#[test]
fn test_missing_secret_file_exits_with_error() {
    let output = Command::new(cargo_bin())
        .env_remove("JWT_SECRET")
        .args([
            "--database",
            ":memory:",
            "--jwt-secret-file",
            "/nonexistent/roombook-secret",
        ])
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(
        combined.contains("Failed to read JWT secret file"),
        "got: {}",
        combined
    );
}

#[test]
fn test_invalid_bcrypt_cost_rejected_by_cli() {
    let output = Command::new(cargo_bin())
        .env("JWT_SECRET", "test-secret-that-is-long-enough!!")
        .args(["--bcrypt-cost", "2"])
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
}
