//! Binary tests; none of these reach the network

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fieldsales(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fieldsales").unwrap();
    cmd.current_dir(dir.path())
        .env("FIELDSALES_DATA_DIR", dir.path())
        .env_remove("FIELDSALES_TOKEN")
        .env_remove("FIELDSALES_API_URL")
        .env_remove("FIELDSALES_ACTOR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("records"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn export_without_columns_is_rejected() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["export", "sheet", "--types", "visits", "--columns", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Select at least one column to export"));
    assert!(!dir.path().join("exports").exists());
}

#[test]
fn export_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["export", "sheet", "--types", "visits,budgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown data type: 'budgets'"));
}

#[test]
fn export_columns_lists_keys() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["export", "columns", "visits"])
        .assert()
        .success()
        .stdout(predicate::str::contains("client.name"))
        .stdout(predicate::str::contains("contact1Name"));
}

#[test]
fn export_columns_saves_preset() {
    let dir = TempDir::new().unwrap();
    let preset = dir.path().join("visits.yaml");
    fieldsales(&dir)
        .args(["export", "columns", "visits", "--save"])
        .arg(&preset)
        .assert()
        .success();
    let contents = std::fs::read_to_string(preset).unwrap();
    assert!(contents.contains("visits"));
}

#[test]
fn employee_report_rejects_reversed_window() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args([
            "report",
            "employees",
            "--start",
            "2025-10-31",
            "--end",
            "2025-10-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end date"));
}

#[test]
fn config_shows_defaults() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:5000/api"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn config_persists_changes() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["config", "--set-actor", "Admin", "--set-api-url", "https://crm.example.com/api/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved"));

    fieldsales(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://crm.example.com/api"))
        .stdout(predicate::str::contains("Admin"));
}

#[test]
fn config_rejects_bad_url() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["config", "--set-api-url", "crm.example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));
}

#[test]
fn auth_status_without_token() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token:   none"));
}

#[test]
fn audit_without_log() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit log yet"));
}

#[test]
fn audit_filters_by_type() {
    let dir = TempDir::new().unwrap();
    let log = [
        r#"{"timestamp":"2025-10-01T08:00:00Z","operation":"delete","data_type":"visits","record_id":"v1"}"#,
        r#"{"timestamp":"2025-10-02T08:00:00Z","operation":"respond","data_type":"quotations","record_id":"q1"}"#,
    ]
    .join("\n");
    std::fs::write(dir.path().join("audit.log"), log).unwrap();

    fieldsales(&dir)
        .args(["audit", "--type", "quotations"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RESPOND"))
        .stdout(predicate::str::contains("q1"))
        .stdout(predicate::str::contains("v1").not());
}

#[test]
fn audit_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    fieldsales(&dir)
        .args(["audit", "--type", "budgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown data type 'budgets'"));
}

#[test]
fn bulk_add_with_empty_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("visits.json");
    std::fs::write(&input, "[]").unwrap();
    fieldsales(&dir)
        .args(["bulk", "add", "visits"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("holds no records"));
}
