//! Integration tests for the `mapinv` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions,
//! reading the data file and error handling. None of them needs a live
//! GeoServer or Airtable base.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `mapinv` binary with env isolation.
///
/// Clears the `MAPINV_*` flag variables and points config directories at
/// a nonexistent path so tests never touch the user's real configuration.
fn mapinv_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mapinv");
    cmd.env("HOME", "/tmp/mapinv-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/mapinv-cli-test-nonexistent")
        .env_remove("MAPINV_CONFIG")
        .env_remove("MAPINV_DATA_FILE")
        .env_remove("MAPINV_OUTPUT")
        .env_remove("MAPINV_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const DATA: &str = r#"{
  "servers": [
    {
      "id": "01DRS53XAG5E85MJNYTA6WPTBM",
      "label": "production",
      "hostname": "maps.example.com",
      "type": "geoserver",
      "version": "2.25.1"
    }
  ],
  "namespaces": [
    {
      "id": "01DRS53XAGEXJ0JWD5BQ7K9V6Q",
      "label": "ops",
      "title": "Operations",
      "namespace": "https://maps.example.com/ops",
      "isolated": false,
      "relationships": { "servers": "01DRS53XAG5E85MJNYTA6WPTBM" }
    }
  ]
}
"#;

const CONFIG: &str = r#"
[airtable]
base_id = "appXXXXXXXXXXXXXX"
api_key = "keyXXXXXXXXXXXXXX"
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = mapinv_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    mapinv_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("GeoServer")
            .and(predicate::str::contains("data"))
            .and(predicate::str::contains("airtable"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    mapinv_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mapinv"));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let output = mapinv_cmd().args(["data", "list", "wombats"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    mapinv_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    mapinv_cmd()
        .args(["config", "path", "--config", "/tmp/elsewhere/config.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/config.toml"));
}

#[test]
fn test_config_show_masks_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "config.toml", CONFIG);

    mapinv_cmd()
        .args(["config", "show", "--output", "json", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("appXXXXXXXXXXXXXX")
                .and(predicate::str::contains("keyXXXXXXXXXXXXXX").not()),
        );
}

// ── Data file ───────────────────────────────────────────────────────

#[test]
fn test_data_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "data.json", DATA);
    let config = write(dir.path(), "config.toml", "");

    let output = mapinv_cmd()
        .args(["data", "list", "namespaces", "-o", "json", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(&data)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["label"], "ops");
}

#[test]
fn test_data_list_plain_prints_ids() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "data.json", DATA);
    let config = write(dir.path(), "config.toml", "");

    mapinv_cmd()
        .args(["data", "list", "servers", "-o", "plain", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("01DRS53XAG5E85MJNYTA6WPTBM"));
}

#[test]
fn test_missing_data_file_points_at_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "config.toml", "");

    let output = mapinv_cmd()
        .args(["data", "list", "layers", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(dir.path().join("absent.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("data fetch"), "Expected hint in output:\n{text}");
}

#[test]
fn test_dangling_reference_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dangling = DATA.replace(
        r#""servers": "01DRS53XAG5E85MJNYTA6WPTBM""#,
        r#""servers": "01DRS53XAGNOSUCHSERVER0000""#,
    );
    let data = write(dir.path(), "data.json", &dangling);
    let config = write(dir.path(), "config.toml", "");

    let output = mapinv_cmd()
        .args(["data", "list", "namespaces", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(&data)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_fetch_without_servers_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "config.toml", "");

    let output = mapinv_cmd()
        .args(["data", "fetch", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(dir.path().join("data.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(!dir.path().join("data.json").exists());
}

// ── Airtable ────────────────────────────────────────────────────────

#[test]
fn test_reset_requires_yes_when_not_interactive() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "data.json", DATA);
    let config = write(dir.path(), "config.toml", CONFIG);

    let output = mapinv_cmd()
        .args(["airtable", "reset", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(&data)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--yes"), "Expected '--yes' hint in output:\n{text}");
}

#[test]
fn test_airtable_without_base_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let data = write(dir.path(), "data.json", DATA);
    let config = write(dir.path(), "config.toml", "");

    let output = mapinv_cmd()
        .args(["at", "status", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(&data)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("base_id"), "Expected field name in output:\n{text}");
}
