// tests/test_cli.rs
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("autotag"))
        .stdout(predicate::str::contains("autotag-sync"))
        .stdout(predicate::str::contains("create-db"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pocktag"));
}

#[test]
fn test_create_db_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("library.db");

    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.args(["create-db", db.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created database"));
    assert!(db.exists());
}

#[test]
fn test_create_db_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("library.db");
    std::fs::write(&db, "not a database").unwrap();

    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.args(["create-db", db.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_info_on_fresh_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("library.db");

    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.env("POCKTAG_DB_URL", db.to_str().unwrap())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Items: 0"))
        .stdout(predicate::str::contains("Cursor: none"));
}

#[test]
fn test_fetch_with_missing_auth_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("library.db");

    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.env("POCKTAG_DB_URL", db.to_str().unwrap())
        .env("POCKTAG_AUTH_PATH", dir.path().join("missing.json").to_str().unwrap())
        .args(["fetch", "--silent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn test_no_command_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("library.db");

    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.env("POCKTAG_DB_URL", db.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no command given"));
}

#[test]
fn test_autotag_errors_conflicts_with_all() {
    let mut cmd = Command::cargo_bin("pocktag").unwrap();
    cmd.args(["autotag", "--errors", "--all"]).assert().failure();
}
