//! Binary-level tests that never touch the network.

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

const PREAMBLE: &str =
    "# Code Review Checklist\n\nThis file is referenced automatically by GitHub Copilot Spaces.\n\n";

/// `rck` with a private config file and no connection settings from the env.
fn rck(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rck").unwrap();
    cmd.env("RCK_CONFIG", config)
        .env_remove("GITHUB_TOKEN")
        .env_remove("RCK_OWNER")
        .env_remove("RCK_REPO")
        .env_remove("RCK_FILE_PATH")
        .env_remove("RCK_API_BASE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{output:?}");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn version_prints_name() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(rck(&dir.path().join("config.json")).arg("version"));
    assert!(out.starts_with("rck version "));
}

#[test]
fn version_json() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(rck(&dir.path().join("config.json")).args(["--json", "version"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn fmt_normalizes_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("checklist.md");
    std::fs::write(&input, "## Correctness\n* Check nulls\n- Check nulls\n## Empty\n").unwrap();

    let out = stdout_of(rck(&dir.path().join("config.json")).arg("fmt").arg(&input));
    assert_eq!(out, format!("{PREAMBLE}## Correctness\n\n- Check nulls\n\n"));
}

#[test]
fn fmt_reads_stdin_with_task_list_dialect() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(
        rck(&dir.path().join("config.json"))
            .args(["fmt", "--dialect", "task_list"])
            .write_stdin("## A\n- [x] done\n- open\n"),
    );
    assert_eq!(out, format!("{PREAMBLE}## A\n\n- [ ] done\n- [ ] open\n\n"));
}

#[test]
fn fmt_missing_file_is_invalid_argument() {
    let dir = TempDir::new().unwrap();
    let output = rck(&dir.path().join("config.json"))
        .args(["fmt", "does-not-exist.md"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn list_without_settings_is_not_configured() {
    let dir = TempDir::new().unwrap();
    let output = rck(&dir.path().join("config.json"))
        .args(["--json", "list"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["code"], "NOT_CONFIGURED");
    assert!(err["error"]["hint"].is_string());
}

#[test]
fn add_without_token_is_not_configured() {
    let dir = TempDir::new().unwrap();
    let output = rck(&dir.path().join("config.json"))
        .args(["--owner", "acme", "--repo", "web", "add", "Correctness", "Check nulls"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("token"), "{stderr}");
}

#[test]
fn config_set_then_show_masks_token() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    stdout_of(rck(&config).args(["config", "set", "owner", "acme"]));
    stdout_of(rck(&config).args(["config", "set", "token", "ghp_abcdefghijklmnop"]));

    let out = stdout_of(rck(&config).args(["--json", "config", "show"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["settings"]["owner"], "acme");
    assert_eq!(value["settings"]["token"], "****mnop");
    assert_eq!(value["missing"], serde_json::json!(["repo"]));

    let stored = std::fs::read_to_string(&config).unwrap();
    assert!(stored.contains("ghp_abcdefghijklmnop"));
}

#[test]
fn config_path_honors_env() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.json");
    let out = stdout_of(rck(&config).args(["config", "path"]));
    assert_eq!(out.trim(), config.display().to_string());
}

#[test]
fn completions_mention_binary() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(rck(&dir.path().join("config.json")).args(["completions", "bash"]));
    assert!(out.contains("rck"));
}
