//! CLI tests for dme-nxos
//!
//! This test suite covers:
//! - Argument parsing and help output
//! - Usage errors and their exit codes
//! - End-to-end runs against a mock device with assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command with a clean environment: no device settings leak in from the
/// host running the tests.
fn dme_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dme-nxos").unwrap();
    for var in [
        "DME_HOST",
        "DME_PORT",
        "DME_USER",
        "DME_PASSWORD",
        "DME_USE_SSL",
        "DME_VALIDATE_CERTS",
        "DME_TIMEOUT",
        "DME_NXOS_CONFIG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home).env("NO_COLOR", "1").current_dir(home);
    cmd
}

/// Config file pointing at the mock device.
fn device_config(dir: &TempDir, server: &MockServer) -> std::path::PathBuf {
    let address = server.address();
    let path = dir.path().join("device.toml");
    std::fs::write(
        &path,
        format!(
            "[device]\nhost = \"{}\"\nport = {}\nuse_ssl = false\nusername = \"admin\"\npassword = \"secret\"\n",
            address.ip(),
            address.port()
        ),
    )
    .unwrap();
    path
}

/// Run a prepared command off the async runtime.
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

// ============================================================================
// Argument Parsing
// ============================================================================

#[test]
fn test_help() {
    let home = tempdir().unwrap();
    dme_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("read-class"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("interfaces"));
}

#[test]
fn test_version() {
    let home = tempdir().unwrap();
    dme_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dme-nxos"));
}

#[test]
fn test_unknown_subcommand() {
    let home = tempdir().unwrap();
    dme_cmd(home.path()).arg("playbook").assert().failure();
}

#[test]
fn test_validate_src_conflicts_with_line() {
    let home = tempdir().unwrap();
    dme_cmd(home.path())
        .args(["validate", "--src", "running.cfg", "--line", "hostname a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// Usage Errors
// ============================================================================

#[test]
fn test_read_class_without_host() {
    let home = tempdir().unwrap();
    dme_cmd(home.path())
        .args(["read-class", "l1PhysIf"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("host"));
}

#[test]
fn test_json_error_output() {
    let home = tempdir().unwrap();
    let output = dme_cmd(home.path())
        .args(["--output", "json", "read-dn", "sys"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8(output.stderr).unwrap();
    let line = stderr.lines().last().unwrap();
    let value: Value = serde_json::from_str(line).unwrap();
    assert_eq!(value["failed"], true);
}

#[test]
fn test_apply_missing_file() {
    let home = tempdir().unwrap();
    dme_cmd(home.path())
        .args(["--host", "192.0.2.1", "apply", "does-not-exist.json"])
        .assert()
        .code(4);
}

// ============================================================================
// Against a Mock Device
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_read_class_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/node/class/l1PhysIf.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"totalCount": "0", "imdata": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    let config = device_config(&home, &server);
    let mut cmd = dme_cmd(home.path());
    cmd.arg("-c")
        .arg(&config)
        .args(["--output", "json", "read-class", "l1PhysIf", "--rsp-prop-include", "config-only"]);

    let assert = run(cmd).await.success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["changed"], false);
    assert_eq!(value["class"], json!({"totalCount": "0", "imdata": []}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validate_rejected_exits_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"jsonrpc": "2.0", "result": {"msg": "{}"}, "id": 1},
            {"jsonrpc": "2.0", "error": {"code": -32602, "message": "Invalid params"}, "id": 2},
            {"jsonrpc": "2.0", "result": {"msg": "{\"topSystem\":{}}"}, "id": 3}
        ])))
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    let config = device_config(&home, &server);
    let mut src = NamedTempFile::new_in(home.path()).unwrap();
    writeln!(src, "interface Ethernet1/1\n  speed 1000000\n! comment\n  no shutdown").unwrap();

    let mut cmd = dme_cmd(home.path());
    cmd.arg("-c")
        .arg(&config)
        .args(["--output", "json", "validate", "--src"])
        .arg(src.path());

    let assert = run(cmd).await.code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["valid"], false);
    assert_eq!(value["errors"], json!({"1": "  speed 1000000"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_check_mode_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    let config = device_config(&home, &server);
    let tree = home.path().join("tree.yml");
    std::fs::write(&tree, "topSystem:\n  attributes:\n    name: leaf1\n").unwrap();

    let mut cmd = dme_cmd(home.path());
    cmd.arg("-c")
        .arg(&config)
        .args(["--check", "apply"])
        .arg(&tree);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Would apply DME configuration"));
}
