//! Integration tests for the `mapper` CLI binary.
//!
//! Argument parsing, help output and completions run without a backend.
//! Session tests point the binary at a wiremock server and an isolated
//! config/data directory.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `mapper` binary with env isolation.
///
/// Clears all `MAPPER_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration.
fn mapper_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mapper");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("MAPPER_PROFILE")
        .env_remove("MAPPER_API_URL")
        .env_remove("MAPPER_WS_URL")
        .env_remove("MAPPER_OUTPUT")
        .env_remove("MAPPER_INSECURE")
        .env_remove("MAPPER_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn mapper_cmd() -> assert_cmd::Command {
    mapper_cmd_in(Path::new("/tmp/mapper-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write a profile whose password comes from `LAB_PASSWORD`.
fn write_profile(home: &Path, api_url: &str) {
    let dir = home.join("config").join("mapper");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!(
            "default_profile = \"default\"\n\n\
             [profiles.default]\n\
             api_url = \"{api_url}\"\n\
             username = \"alice\"\n\
             password_env = \"LAB_PASSWORD\"\n"
        ),
    )
    .unwrap();
}

fn user_json() -> Value {
    json!({
        "id": "u1",
        "username": "alice",
        "email": "alice@example.net",
        "firstName": "Alice",
        "lastName": "Ng",
        "role": "operator",
        "permissions": [],
        "isActive": true,
        "createdAt": "2026-01-10T08:00:00Z",
        "updatedAt": "2026-01-10T08:00:00Z"
    })
}

fn device_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("rtr-{id}"),
        "hostname": format!("rtr-{id}.lab"),
        "ipAddress": "192.0.2.10",
        "port": 830,
        "vendor": "juniper",
        "deviceType": "router",
        "protocol": "netconf",
        "credentials": { "username": "netops" },
        "connectionStatus": "connected",
        "isActive": true,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = mapper_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    mapper_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("yang-models"))
            .and(predicate::str::contains("api-schemas"))
            .and(predicate::str::contains("notifications")),
    );
}

#[test]
fn test_version_flag() {
    mapper_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mapper"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    mapper_cmd().arg("routers").assert().code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    mapper_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_config_home() {
    let home = tempfile::tempdir().unwrap();
    mapper_cmd_in(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    mapper_cmd_in(home.path())
        .args(["--profile", "staging", "dashboard"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Profile 'staging' not found"));
}

#[test]
fn test_bad_api_url_scheme_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    mapper_cmd_in(home.path())
        .args(["--api-url", "ftp://example.net", "dashboard"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api_url"));
}

// ── Route guard ─────────────────────────────────────────────────────

#[test]
fn test_protected_command_without_session_needs_login() {
    let home = tempfile::tempdir().unwrap();
    mapper_cmd_in(home.path())
        .args(["--api-url", "http://127.0.0.1:9/api", "devices", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_ui_preferences_persist_without_backend() {
    let home = tempfile::tempdir().unwrap();
    mapper_cmd_in(home.path())
        .args(["ui", "theme", "dark"])
        .assert()
        .success();
    mapper_cmd_in(home.path())
        .args(["-o", "plain", "ui", "show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("dark\n"));
}

// ── Session against a mock backend ──────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_list_devices() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    write_profile(home.path(), &format!("{}/api", server.uri()));

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json(),
            "token": "T",
            "refreshToken": "R"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [device_json("d1"), device_json("d2")],
            "pagination": {
                "page": 1, "limit": 20, "total": 2,
                "totalPages": 1, "hasNext": false, "hasPrev": false
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    mapper_cmd_in(home.path())
        .env("LAB_PASSWORD", "pw")
        .args(["-o", "plain", "login"])
        .assert()
        .success()
        .stdout(predicate::str::diff("alice\n"))
        .stderr(predicate::str::contains("Signed in as alice"));

    mapper_cmd_in(home.path())
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("d1\nd2\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_login_prints_banner_and_exits_auth() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    write_profile(home.path(), &format!("{}/api", server.uri()));

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    mapper_cmd_in(home.path())
        .env("LAB_PASSWORD", "wrong")
        .arg("login")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid credentials"));
}
