use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with an isolated home so no real settings or token leak in
fn seed_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gh-demo-seed").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_REPO")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    seed_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("cleanup"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn create_rejects_same_branch_pull_request_before_network() {
    let home = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    fs::write(
        content.path().join("prs.json"),
        r#"[{"title": "Demo", "head": "main", "base": "main"}]"#,
    )
    .unwrap();

    seed_cmd(home.path())
        .args(["--repo", "octo/demo", "create", "--content-dir"])
        .arg(content.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation error"))
        .stderr(predicate::str::contains("must differ"));
}

#[test]
fn create_only_skips_validation_of_unselected_kinds() {
    let home = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    fs::write(
        content.path().join("prs.json"),
        r#"[{"title": "Demo", "head": "main", "base": "main"}]"#,
    )
    .unwrap();

    seed_cmd(home.path())
        .args(["--repo", "octo/demo", "create", "--only", "label", "--content-dir"])
        .arg(content.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to create"));
}

#[test]
fn create_with_missing_content_dir_is_file_error() {
    let home = TempDir::new().unwrap();
    seed_cmd(home.path())
        .args(["--repo", "octo/demo", "create", "--content-dir"])
        .arg(home.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file error"));
}

#[test]
fn create_with_empty_content_does_nothing() {
    let home = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();

    seed_cmd(home.path())
        .args(["--repo", "octo/demo", "create", "--content-dir"])
        .arg(content.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to create"));
}

#[test]
fn cleanup_rejects_invalid_preserve_pattern() {
    let home = TempDir::new().unwrap();
    let content = TempDir::new().unwrap();
    fs::write(
        content.path().join("preserve.json"),
        r#"{"issues": {"preserve_by_title": ["^[unclosed"]}}"#,
    )
    .unwrap();

    seed_cmd(home.path())
        .args(["--repo", "octo/demo", "cleanup", "--dry-run", "--content-dir"])
        .arg(content.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn invalid_repo_flag_is_rejected() {
    let home = TempDir::new().unwrap();
    seed_cmd(home.path())
        .args(["--repo", "nonsense", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}
