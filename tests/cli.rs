use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const IMPORT_CSV: &str = "LastName,FirstName,Date,Amount,FundName,CheckNumber\n\
                          Smith,John,01/05/2025,125.00,General Fund,1001\n\
                          Doe,Jane,01/05/2025,40.00,Missions,1002\n\
                          Smith,John,01/12/2025,\"$1,250.00\",,1003\n\
                          ,Lee,01/12/2025,10.00,,1004\n";

fn offertory(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("offertory").unwrap();
    cmd.env("OFFERTORY_DATA_DIR", data_dir)
        .env_remove("OFFERTORY_USER")
        .env_remove("OFFERTORY_PASSWORD")
        .env_remove("OFFERTORY_NEW_PASSWORD")
        .env_remove("OFFERTORY_LOG");
    cmd
}

/// Initialize a data directory and return the admin's temporary password
fn init(data_dir: &Path) -> String {
    let output = offertory(data_dir).arg("init").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Temporary password for 'admin': "))
        .map(|p| p.trim().to_string())
        .unwrap()
}

fn as_admin(data_dir: &Path, password: &str) -> Command {
    let mut cmd = offertory(data_dir);
    cmd.env("OFFERTORY_USER", "admin")
        .env("OFFERTORY_PASSWORD", password);
    cmd
}

#[test]
fn commands_require_init() {
    let temp = TempDir::new().unwrap();
    offertory(temp.path())
        .args(["batch", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offertory init"));
}

#[test]
fn init_twice_keeps_the_first_password() {
    let temp = TempDir::new().unwrap();
    let password = init(temp.path());

    offertory(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));

    as_admin(temp.path(), &password)
        .arg("login")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as admin (ADMIN)"))
        .stderr(predicate::str::contains("temporary password"));
}

#[test]
fn commands_require_a_user_and_valid_password() {
    let temp = TempDir::new().unwrap();
    init(temp.path());

    offertory(temp.path())
        .args(["batch", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No user given"));

    as_admin(temp.path(), "wrong")
        .args(["batch", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid username or password"));
}

#[test]
fn passwd_replaces_the_temporary_password() {
    let temp = TempDir::new().unwrap();
    let password = init(temp.path());

    as_admin(temp.path(), &password)
        .env("OFFERTORY_NEW_PASSWORD", "correct horse")
        .arg("passwd")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password changed for admin"));

    as_admin(temp.path(), "correct horse")
        .arg("login")
        .assert()
        .success()
        .stderr(predicate::str::contains("temporary").not());

    as_admin(temp.path(), &password)
        .arg("login")
        .assert()
        .failure();
}

#[test]
fn import_creates_one_batch_per_date() {
    let temp = TempDir::new().unwrap();
    let password = init(temp.path());
    let csv_path = temp.path().join("checks.csv");
    fs::write(&csv_path, IMPORT_CSV).unwrap();

    as_admin(temp.path(), &password)
        .arg("import")
        .arg(&csv_path)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would import 3 donation(s)"))
        .stdout(predicate::str::contains("line 5"));

    as_admin(temp.path(), &password)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported 3 donation(s) into 2 batch(es)",
        ));

    as_admin(temp.path(), &password)
        .args(["batch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20250105-01"))
        .stdout(predicate::str::contains("20250112-01"))
        .stdout(predicate::str::contains("$1250.00"));

    as_admin(temp.path(), &password)
        .args(["batch", "total", "20250105-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$165.00"));
}

#[test]
fn export_csv_reads_back_the_import() {
    let temp = TempDir::new().unwrap();
    let password = init(temp.path());
    let csv_path = temp.path().join("checks.csv");
    fs::write(&csv_path, IMPORT_CSV).unwrap();

    as_admin(temp.path(), &password)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success();

    as_admin(temp.path(), &password)
        .args(["export", "csv", "--from", "01/10/2025"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "First Name,Last Name,Check Date,Check Amount,Check Number,Fund Name",
        ))
        .stdout(predicate::str::contains(
            "John,Smith,01/12/2025,1250.00,1003,General Fund",
        ))
        .stdout(predicate::str::contains("Jane").not());
}

#[test]
fn manual_entry_and_closed_batches() {
    let temp = TempDir::new().unwrap();
    let password = init(temp.path());

    as_admin(temp.path(), &password)
        .args(["batch", "create", "--date", "2025-03-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created batch: 20250302-01"));

    as_admin(temp.path(), &password)
        .args([
            "donation", "add", "20250302-01", "--amount", "75", "--first", "Ruth", "--last",
            "Miller", "--check", "88",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("New donor: Ruth Miller"))
        .stdout(predicate::str::contains("Batch total: $75.00 (1 checks)"));

    as_admin(temp.path(), &password)
        .args(["batch", "close", "20250302-01"])
        .assert()
        .success();

    as_admin(temp.path(), &password)
        .args([
            "donation", "add", "20250302-01", "--amount", "5", "--donor", "Ruth Miller",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
}

#[test]
fn dashboard_and_backup() {
    let temp = TempDir::new().unwrap();
    let password = init(temp.path());
    let csv_path = temp.path().join("checks.csv");
    fs::write(&csv_path, IMPORT_CSV).unwrap();

    as_admin(temp.path(), &password)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success();

    as_admin(temp.path(), &password)
        .args(["dashboard", "--as-of", "2025-01-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Month to date"))
        .stdout(predicate::str::contains("$1415.00"));

    as_admin(temp.path(), &password)
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("offertory-backup-"));

    as_admin(temp.path(), &password)
        .args(["backup", "restore", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"));

    as_admin(temp.path(), &password)
        .args(["donation", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TOTAL (3 checks)"));
}
