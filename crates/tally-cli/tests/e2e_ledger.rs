//! E2E CLI tests covering:
//! - ledger bootstrap (`tally init`)
//! - category and booking lifecycle with inflow/outflow projection
//! - effective-date edit locks (`--as-of`)
//! - ad-hoc query sandbox rejections and rewrites
//! - cascading category delete and Markdown export
//!
//! Each test runs `tally` as a subprocess against a ledger in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn db_path(dir: &Path) -> PathBuf {
    dir.join("ledger.sqlite3")
}

/// Build a Command targeting the tally binary with its own ledger file.
fn tally(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tally"));
    cmd.current_dir(dir);
    cmd.arg("--db").arg(db_path(dir));
    cmd.env("TALLY_LOG", "error");
    cmd.env_remove("TALLY_DB");
    cmd.env_remove("TALLY_AS_OF");
    cmd.env_remove("FORMAT");
    cmd
}

fn json_ok(dir: &Path, args: &[&str]) -> Value {
    let output = tally(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("tally should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

/// Run a command expected to fail and return the JSON error object.
fn json_err(dir: &Path, args: &[&str]) -> Value {
    let output = tally(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("tally should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    let json: Value =
        serde_json::from_slice(&output.stderr).expect("errors should be JSON in --json mode");
    json["error"].clone()
}

fn setup() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    tally(dir.path()).arg("init").assert().success();
    dir
}

fn add_category(dir: &Path, name: &str, flow: &str) -> i64 {
    let json = json_ok(dir, &["category", "add", name, "--flow", flow]);
    json["id"].as_i64().expect("category id")
}

fn add_booking(dir: &Path, date: &str, note: &str, amount: &str, category: &str) -> i64 {
    let json = json_ok(
        dir,
        &[
            "add", "--note", note, "--amount", amount, "--category", category, "--date", date,
        ],
    );
    json["id"].as_i64().expect("booking id")
}

fn list_rows(dir: &Path, extra: &[&str]) -> Vec<Value> {
    let mut args = vec!["list"];
    args.extend_from_slice(extra);
    json_ok(dir, &args)["rows"]
        .as_array()
        .expect("rows array")
        .clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn init_creates_migrated_ledger() {
    let dir = TempDir::new().expect("create temp dir");
    let json = json_ok(dir.path(), &["init"]);
    assert_eq!(json["schema_version"], 3);
    assert_eq!(json["categories"], 0);
    assert!(db_path(dir.path()).exists());

    // idempotent
    json_ok(dir.path(), &["init"]);
}

#[test]
fn rent_booking_lands_in_outflow_column() {
    let dir = setup();
    add_category(dir.path(), "Salary", "in");
    add_category(dir.path(), "Rent", "out");
    add_booking(dir.path(), "2024-01-10", "January rent", "1200", "Rent");

    let rows = list_rows(dir.path(), &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["outflow"], "1200");
    assert!(rows[0]["inflow"].is_null());
    assert_eq!(rows[0]["category"], "Rent");
    assert_eq!(rows[0]["date"], "2024-01-10");
}

#[test]
fn effective_date_locks_older_rows() {
    let dir = setup();
    add_category(dir.path(), "Rent", "out");
    let old = add_booking(dir.path(), "2024-01-10", "January rent", "1200", "Rent");
    let new = add_booking(dir.path(), "2024-01-20", "Parking", "40", "Rent");

    let err = json_err(
        dir.path(),
        &["--as-of", "2024-01-15", "edit", &old.to_string(), "note", "changed"],
    );
    assert_eq!(err["error_code"], "E2001");

    let outcome = json_ok(
        dir.path(),
        &["--as-of", "2024-01-15", "edit", &new.to_string(), "outflow", "45,50"],
    );
    assert_eq!(outcome["value"], "45.5");

    let rows = list_rows(dir.path(), &[]);
    assert_eq!(rows[0]["note"], "January rent");
    assert_eq!(rows[1]["outflow"], "45.5");
}

#[test]
fn date_edit_round_trips() {
    let dir = setup();
    add_category(dir.path(), "Food", "out");
    let id = add_booking(dir.path(), "2030-05-01", "Groceries", "80", "Food");

    json_ok(
        dir.path(),
        &["--as-of", "2030-01-01", "edit", &id.to_string(), "date", "2030-06-02"],
    );
    let rows = list_rows(dir.path(), &[]);
    assert_eq!(rows[0]["date"], "2030-06-02");

    let err = json_err(
        dir.path(),
        &["--as-of", "2030-01-01", "edit", &id.to_string(), "date", "02.06.2030"],
    );
    assert_eq!(err["error_code"], "E2001");
}

#[test]
fn category_column_is_not_editable() {
    let dir = setup();
    add_category(dir.path(), "Food", "out");
    let id = add_booking(dir.path(), "2030-05-01", "Groceries", "80", "Food");

    let err = json_err(
        dir.path(),
        &["--as-of", "2030-01-01", "edit", &id.to_string(), "category", "Rent"],
    );
    assert_eq!(err["error_code"], "E3001");
}

#[test]
fn search_and_date_filters_combine() {
    let dir = setup();
    add_category(dir.path(), "Rent", "out");
    add_category(dir.path(), "Salary", "in");
    add_booking(dir.path(), "2024-01-01", "January rent", "1200", "Rent");
    add_booking(dir.path(), "2024-01-31", "Salary January", "2500", "Salary");
    add_booking(dir.path(), "2024-02-01", "February RENT", "1200", "Rent");

    let rows = list_rows(dir.path(), &["--search", "rent"]);
    assert_eq!(rows.len(), 2);

    let rows = list_rows(dir.path(), &["--search", "rent", "--from", "15.01.2024"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["note"], "February RENT");

    let json = json_ok(dir.path(), &["list", "--to", "2024-01-31"]);
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["totals"]["inflow"], "2500");
    assert_eq!(json["totals"]["outflow"], "1200");
    assert_eq!(json["totals"]["balance"], "1300");
}

#[test]
fn query_rejects_writes_and_wraps_conditions() {
    let dir = setup();
    add_category(dir.path(), "Rent", "out");
    add_booking(dir.path(), "2024-01-10", "January rent", "1200", "Rent");
    add_booking(dir.path(), "2024-01-11", "Coffee", "3", "Rent");

    let err = json_err(dir.path(), &["query", "update Bookings set amount=0"]);
    assert_eq!(err["error_code"], "E4001");

    let grid = json_ok(dir.path(), &["query", "note like '%rent%'"]);
    assert_eq!(grid["rows"].as_array().map(Vec::len), Some(1));
    assert_eq!(grid["columns"][2], "note");

    let grid = json_ok(dir.path(), &["query", "outflow > 100"]);
    assert_eq!(grid["rows"].as_array().map(Vec::len), Some(1));

    let rows = list_rows(dir.path(), &[]);
    assert_eq!(rows[0]["outflow"], "1200");
}

#[test]
fn category_delete_refuses_then_cascades() {
    let dir = setup();
    add_category(dir.path(), "Rent", "out");
    add_category(dir.path(), "Food", "out");
    for day in 1..=5 {
        add_booking(dir.path(), &format!("2024-01-0{day}"), "rent", "100", "Rent");
    }
    add_booking(dir.path(), "2024-01-06", "bread", "2", "Food");

    let err = json_err(dir.path(), &["category", "delete", "Rent"]);
    assert_eq!(err["error_code"], "E2001");
    assert_eq!(list_rows(dir.path(), &[]).len(), 6);

    let removal = json_ok(
        dir.path(),
        &["category", "delete", "Rent (out)", "--cascade", "--force"],
    );
    assert_eq!(removal["bookings_removed"], 5);

    let rows = list_rows(dir.path(), &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["category"], "Food");

    let err = json_err(dir.path(), &["category", "show", "Rent"]);
    assert_eq!(err["error_code"], "E2002");
}

#[test]
fn ambiguous_category_needs_suffix() {
    let dir = setup();
    add_category(dir.path(), "Interest", "in");
    add_category(dir.path(), "Interest", "out");

    let err = json_err(
        dir.path(),
        &["add", "-n", "loan", "-a", "10", "-c", "Interest"],
    );
    assert_eq!(err["error_code"], "E2001");

    json_ok(
        dir.path(),
        &["add", "-n", "loan", "-a", "10", "-c", "Interest (out)"],
    );

    let details = json_ok(dir.path(), &["category", "show", "Interest (out)"]);
    assert_eq!(details["booking_count"], 1);
    assert_eq!(details["flow"], "outflow");
}

#[test]
fn delete_missing_booking_is_not_found() {
    let dir = setup();
    let err = json_err(dir.path(), &["delete", "42", "--force"]);
    assert_eq!(err["error_code"], "E2002");
}

#[test]
fn delete_removes_booking() {
    let dir = setup();
    add_category(dir.path(), "Food", "out");
    let id = add_booking(dir.path(), "2024-01-06", "bread", "2", "Food");
    json_ok(dir.path(), &["delete", &id.to_string(), "--force"]);
    assert!(list_rows(dir.path(), &[]).is_empty());
}

#[test]
fn export_writes_markdown_table() {
    let dir = setup();
    add_category(dir.path(), "Rent", "out");
    add_booking(dir.path(), "2024-01-10", "January rent", "1200", "Rent");
    let target = dir.path().join("ledger.md");

    tally(dir.path())
        .args(["export", "--output"])
        .arg(&target)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exported"));

    let markdown = std::fs::read_to_string(&target).expect("read export");
    let lines: Vec<&str> = markdown.lines().collect();
    assert_eq!(lines[0], "|ID|NOTE|INFLOW|OUTFLOW|DATE|CATEGORY|");
    assert_eq!(lines[1], "|---|---|---|---|---|---|");
    assert_eq!(lines[2], "|1|January rent||1200.00|2024-01-10|Rent|");
}

#[test]
fn text_errors_carry_suggestion() {
    let dir = setup();
    tally(dir.path())
        .args(["--format", "text", "query", "delete from bookings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: unsafe query rejected"))
        .stderr(predicate::str::contains("suggestion:"));
}

#[test]
fn completions_need_no_database() {
    let dir = TempDir::new().expect("create temp dir");
    tally(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tally"));
    assert!(!db_path(dir.path()).exists());
}
