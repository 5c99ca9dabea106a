#![allow(deprecated)]
use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

fn ciftt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ciftt").unwrap();
    cmd.current_dir(dir.path())
        .env("GITHUB_TOKEN", "test-token")
        .env_remove("GITHUB_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const TWO_ROWS: &str = "title,url\n\"Fix bug\",\n\"Update docs\",https://tracker/owner/repo/issues/42\n";

// ---------------------------------------------------------------------------
// dry run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_reports_intents() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", TWO_ROWS);

    ciftt(&dir)
        // Unroutable: any network call would fail the row.
        .env("GITHUB_API_URL", "http://127.0.0.1:9")
        .arg(&file)
        .arg("owner/repo")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"))
        .stdout(predicate::str::contains("row 1: would create: Fix bug"))
        .stdout(predicate::str::contains("row 2: would update #42: Update docs"))
        .stdout(predicate::str::contains("failed:").not())
        .stdout(predicate::str::contains("Summary: 1 to create, 1 to update, 0 failed"));
}

#[test]
fn dry_run_json_report() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", TWO_ROWS);

    let output = ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "-d", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["outcomes"][0]["action"], "would_create");
    assert_eq!(report["outcomes"][1]["action"], "would_update");
    assert_eq!(report["outcomes"][1]["number"], 42);
    assert_eq!(
        report["counts"],
        json!({"created": 1, "updated": 1, "failed": 0})
    );
}

#[test]
fn short_rows_are_accepted() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "issues.csv",
        "title,url\nFix bug\nUpdate docs,https://github.com/owner/repo/issues/4\n",
    );

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("row 1: would create: Fix bug"))
        .stdout(predicate::str::contains("row 2: would update #4: Update docs"));
}

#[test]
fn tsv_file_is_read_with_tab_delimiter() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.tsv", "Title\tLabels\nTabbed, with comma\tbug\n");

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would create: Tabbed, with comma"));
}

#[test]
fn explicit_delimiter_is_used() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.txt", "title;body\nSemi;colon\n");

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "--dry-run", "--delimiter", ";"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would create: Semi"));
}

#[test]
fn token_is_read_from_env_file() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "title\nOne\n");
    write(&dir, ".env", "GITHUB_TOKEN=from-dotenv\n");

    ciftt(&dir)
        .env_remove("GITHUB_TOKEN")
        .arg(&file)
        .args(["owner/repo", "--dry-run"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// fatal setup errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_repo_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "title\nOne\n");

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo/extra", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("owner/repo"));
}

#[test]
fn invalid_delimiter_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "title\nOne\n");

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "--dry-run", "--delimiter", "ab"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid delimiter"));
}

#[test]
fn missing_token_fails_before_processing() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "title\nOne\n");

    ciftt(&dir)
        .env_remove("GITHUB_TOKEN")
        .arg(&file)
        .args(["owner/repo", "--dry-run"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("would create").not())
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn missing_title_column_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "name,body\nx,y\n");

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'title' column"));
}

#[test]
fn blank_titles_are_all_reported() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "title\nA\n\"\"\nC\n\" \"\nE\n");

    ciftt(&dir)
        .arg(&file)
        .args(["owner/repo", "--dry-run"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("would create").not())
        .stderr(predicate::str::contains("[2, 4]"));
}

#[test]
fn missing_data_file_fails() {
    let dir = TempDir::new().unwrap();

    ciftt(&dir)
        .args(["does-not-exist.csv", "owner/repo", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist.csv"));
}

// ---------------------------------------------------------------------------
// live sync
// ---------------------------------------------------------------------------

#[test]
fn live_run_creates_and_updates() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "issues.csv",
        "title,description,labels,url,state\nFix bug,Steps to reproduce,\"bug, ui\",,\nUpdate docs,,,https://github.com/owner/repo/issues/42,closed\n",
    );

    let mut server = mockito::Server::new();
    let create = server
        .mock("POST", "/repos/owner/repo/issues")
        .match_header("authorization", "token test-token")
        .match_body(Matcher::Json(json!({
            "title": "Fix bug",
            "body": "Steps to reproduce",
            "labels": ["bug", "ui"]
        })))
        .with_status(201)
        .with_body(r#"{"number": 7, "title": "Fix bug"}"#)
        .create();
    let update = server
        .mock("PATCH", "/repos/owner/repo/issues/42")
        .match_body(Matcher::Json(json!({
            "title": "Update docs",
            "state": "closed"
        })))
        .with_status(200)
        .with_body(r#"{"number": 42, "title": "Update docs"}"#)
        .create();

    ciftt(&dir)
        .env("GITHUB_API_URL", server.url())
        .arg(&file)
        .arg("owner/repo")
        .assert()
        .success()
        .stdout(predicate::str::contains("row 1: created #7: Fix bug"))
        .stdout(predicate::str::contains("row 2: updated #42: Update docs"));

    create.assert();
    update.assert();
}

#[test]
fn partial_failure_still_exits_zero() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "issues.csv",
        "title,url,state\nFirst,,\nSecond,https://github.com/owner/repo/issues/2,bogus\nThird,https://github.com/owner/repo/issues/3,open\n",
    );

    let mut server = mockito::Server::new();
    let create = server
        .mock("POST", "/repos/owner/repo/issues")
        .with_status(201)
        .with_body(r#"{"number": 10, "title": "First"}"#)
        .expect(1)
        .create();
    let update = server
        .mock("PATCH", "/repos/owner/repo/issues/3")
        .with_status(200)
        .with_body(r#"{"number": 3, "title": "Third"}"#)
        .expect(1)
        .create();

    let output = ciftt(&dir)
        .env("GITHUB_API_URL", server.url())
        .arg(&file)
        .args(["owner/repo", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let actions: Vec<&str> = report["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["created", "failed", "updated"]);
    assert_eq!(
        report["counts"],
        json!({"created": 1, "updated": 1, "failed": 1})
    );
    assert!(report["outcomes"][1]["reason"]
        .as_str()
        .unwrap()
        .contains("bogus"));

    create.assert();
    update.assert();
}

#[test]
fn api_error_is_reported_per_row() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "issues.csv", "title\nRejected\n");

    let mut server = mockito::Server::new();
    server
        .mock("POST", "/repos/owner/repo/issues")
        .with_status(403)
        .with_body(r#"{"message": "Resource not accessible by integration"}"#)
        .create();

    ciftt(&dir)
        .env("GITHUB_API_URL", server.url())
        .arg(&file)
        .arg("owner/repo")
        .assert()
        .success()
        .stdout(predicate::str::contains("row 1: failed"))
        .stdout(predicate::str::contains("403"));
}
