//! Integration tests driving the `duplex` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn duplex() -> Command {
    let mut cmd = Command::cargo_bin("duplex").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("IS_DUPLEX_BUILDER")
        .env_remove("DUPLEX_MODE")
        .env_remove("DUPLEX_SERVER_ENTRY");
    cmd
}

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("server")).unwrap();
    fs::write(
        root.join("index.html"),
        "<!doctype html>\n<html><body><script type=\"module\" src=\"/src/main.js\"></script></body></html>\n",
    )
    .unwrap();
    fs::write(root.join("src/main.js"), "console.log('client');\n").unwrap();
    fs::write(root.join("server/main.js"), "console.log('server', __BUILD__);\n").unwrap();
    fs::write(
        root.join("duplex.toml"),
        r#"server_entry = "server/main.js"

[server_config.define]
__BUILD__ = "\"ssr\""
"#,
    )
    .unwrap();
}

#[test]
fn check_prints_resolved_config() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    let output = duplex()
        .args(["check", "--root"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["mode"], "server-first");
    assert_eq!(config["server_entry"], "server/main.js");
    assert_eq!(config["client_config"]["out_dir"], "dist/public");
}

#[test]
fn overlapping_dirs_fail_in_client_first_mode() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    duplex()
        .env("DUPLEX_MODE", "client-first")
        .args(["check", "--root"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlap"));
}

#[test]
fn env_and_flags_override_file() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    let output = duplex()
        .env("DUPLEX_SERVER_ENTRY", "server/env.js")
        .args(["check", "--mode", "skip", "--root"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["mode"], "skip");
    assert_eq!(config["server_entry"], "server/env.js");
}

#[test]
fn missing_config_is_reported() {
    let temp = TempDir::new().unwrap();

    duplex()
        .args(["build", "--root"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No duplex config found"));
}

#[test]
fn invalid_mode_flag_is_rejected() {
    duplex()
        .args(["build", "--mode", "backwards"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backwards"));
}

#[test]
fn build_writes_server_and_client() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_project(root);

    duplex()
        .args(["build", "--quiet", "--root"])
        .arg(root)
        .assert()
        .success()
        .stderr(predicate::str::contains("Server and client bundles built"));

    let server = fs::read_to_string(root.join("dist/app.js")).unwrap();
    assert!(server.contains("ssr"));
    assert!(!server.contains("__BUILD__"));
    assert!(root.join("dist/public/index.html").exists());
}

#[test]
fn skip_mode_builds_the_plain_project() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_project(root);

    duplex()
        .args(["build", "--mode", "skip", "--root"])
        .arg(root)
        .assert()
        .success();

    assert!(root.join("dist/index.html").exists());
    assert!(!root.join("dist/app.js").exists());
}

#[test]
fn missing_config_with_entry_flag_warns_and_uses_defaults() {
    let temp = TempDir::new().unwrap();

    let output = duplex()
        .args(["check", "--server-entry", "server/main.js", "--root"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No duplex.toml found"));

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["client_entry"]["main"], "index.html");
}
