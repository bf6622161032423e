//! End-to-end CLI tests against JSON inventories in `tests/fixtures/`.
//!
//! Each fixture directory holds an `inventory.json` and, where output is compared verbatim,
//! an `expected.records.json` with `__TIMESTAMP__` in place of capture times.

use assert_cmd::Command;
use cloudaudit_test_util::{normalize_nondeterministic, record_times};
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a Command for the cloudaudit binary, run from an empty directory so no
/// stray `cloudaudit.toml` is picked up.
#[allow(deprecated)]
fn cloudaudit_cmd(workdir: &TempDir) -> Command {
    let mut cmd =
        Command::cargo_bin("cloudaudit").expect("cloudaudit binary not found - run `cargo build` first");
    cmd.current_dir(workdir.path());
    cmd
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("cloudaudit-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
}

fn inventory(fixture: &str) -> PathBuf {
    fixtures_dir().join(fixture).join("inventory.json")
}

/// Run `scan --format json` and return the exit code and parsed stdout.
fn scan_json(fixture: &str, extra: &[&str]) -> (i32, Value) {
    let workdir = TempDir::new().expect("create temp dir");
    let output = cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory(fixture))
        .args(["--format", "json"])
        .args(extra)
        .output()
        .expect("run cloudaudit");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{stdout}"));
    (code, value)
}

fn ids(records: &Value) -> Vec<(String, String)> {
    records
        .as_array()
        .expect("records array")
        .iter()
        .map(|r| {
            (
                r["region"].as_str().unwrap().to_string(),
                r["physicalId"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn single_region_encryption_matches_golden() {
    let (code, records) = scan_json(
        "dynamodb_single_region",
        &[
            "--service",
            "dynamodb",
            "--rule",
            "EncryptionAtRest",
            "--region",
            "us-east-1",
        ],
    );

    assert_eq!(code, 2, "FAIL records should exit with 2");

    let expected_text = std::fs::read_to_string(
        fixtures_dir()
            .join("dynamodb_single_region")
            .join("expected.records.json"),
    )
    .expect("read expected records");
    let expected: Value = serde_json::from_str(&expected_text).expect("parse expected records");

    let times = record_times(&records).expect("valid record times");
    assert!(times.windows(2).all(|w| w[0] <= w[1]));

    let actual = normalize_nondeterministic(records);
    assert_eq!(
        actual,
        expected,
        "Actual:\n{}",
        serde_json::to_string_pretty(&actual).unwrap()
    );
}

#[test]
fn all_regions_follow_enabled_order_then_id() {
    let (code, records) = scan_json(
        "multi_region",
        &["--service", "s3", "--rule", "EncryptionAtRest"],
    );

    assert_eq!(code, 2);
    assert_eq!(
        ids(&records),
        vec![
            ("us-west-2".to_string(), "archive-us".to_string()),
            ("us-west-2".to_string(), "backups-us".to_string()),
            ("eu-west-1".to_string(), "assets-eu".to_string()),
            ("eu-west-1".to_string(), "logs-eu".to_string()),
        ]
    );
}

#[test]
fn worker_count_does_not_change_output() {
    let run = |workers: &str| {
        scan_json(
            "multi_region",
            &["--service", "s3", "--rule", "EncryptionAtRest", "--workers", workers],
        )
        .1
    };
    let (one, many) = (run("1"), run("16"));
    assert_eq!(normalize_nondeterministic(one), normalize_nondeterministic(many));
}

#[test]
fn partial_scan_keeps_observed_resources() {
    let (code, records) = scan_json("partial_scan", &["--service", "ec2"]);

    assert_eq!(code, 0, "UNKNOWN and partial scans do not fail the run");
    assert_eq!(
        ids(&records),
        vec![
            ("us-east-1".to_string(), "ec2/us-east-1#3".to_string()),
            ("us-east-1".to_string(), "vol-0a".to_string()),
            ("us-east-1".to_string(), "vol-0b".to_string()),
        ]
    );
    assert_eq!(records[2]["state"], "UNKNOWN");
    assert!(
        records[2]["comment"]
            .as_str()
            .unwrap()
            .contains("UnauthorizedOperation")
    );
}

#[test]
fn partial_scan_reports_region_warning_in_terminal_output() {
    let workdir = TempDir::new().expect("create temp dir");
    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("partial_scan"))
        .args(["--service", "ec2"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("UNKNOWN (1)"))
        .stdout(predicate::str::contains("eu-central-1"));
}

#[test]
fn unreadable_resource_id_is_recorded_as_unknown() {
    let (code, records) = scan_json("partial_scan", &["--service", "ec2", "--resource-id", "vol-0b"]);

    assert_eq!(code, 0);
    assert_eq!(
        ids(&records),
        vec![("us-east-1".to_string(), "vol-0b".to_string())]
    );
    assert_eq!(records[0]["state"], "UNKNOWN");
}

#[test]
fn resource_id_behind_a_failing_region_is_a_partial_scan() {
    let workdir = TempDir::new().expect("create temp dir");
    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("partial_scan"))
        .args(["--service", "ec2", "--resource-id", "vol-eu"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No resources found."))
        .stdout(predicate::str::contains("Partial scan: 1 region(s)"))
        .stdout(predicate::str::contains("eu-central-1"));
}

#[test]
fn missing_resource_id_is_fatal() {
    let workdir = TempDir::new().expect("create temp dir");
    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("dynamodb_single_region"))
        .args(["--service", "dynamodb", "--resource-id", "ghost", "--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot resolve scan scope"))
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn resource_id_scans_one_resource() {
    let (code, records) = scan_json(
        "dynamodb_single_region",
        &["--service", "dynamodb", "--rule", "EncryptionAtRest", "--resource-id", "payments"],
    );

    assert_eq!(code, 0);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["state"], "OK");
    assert_eq!(records[0]["name"], "Payments");
}

#[test]
fn unknown_profile_is_an_authorization_error() {
    let workdir = TempDir::new().expect("create temp dir");
    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("unauthorized_profile"))
        .args(["--service", "rds"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("authorization failed"));
}

#[test]
fn silent_terminal_prints_nothing_but_writes_out_file() {
    let workdir = TempDir::new().expect("create temp dir");
    let out = workdir.path().join("reports").join("records.json");

    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("dynamodb_single_region"))
        .args(["--service", "dynamodb", "--rule", "EncryptionAtRest", "--silent"])
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&out).expect("read out file");
    let records: Value = serde_json::from_str(&text).expect("parse out file");
    assert_eq!(records.as_array().unwrap().len(), 3);
}

#[test]
fn config_file_sets_format_and_fail_on() {
    let workdir = TempDir::new().expect("create temp dir");
    std::fs::write(
        workdir.path().join("cloudaudit.toml"),
        "format = \"json\"\nworkers = 2\n",
    )
    .expect("write config");

    let output = cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("dynamodb_single_region"))
        .args(["--service", "dynamodb", "--rule", "EncryptionAtRest"])
        .output()
        .expect("run cloudaudit");

    let records: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(records.as_array().unwrap().len(), 3);
}

#[test]
fn invalid_config_is_reported() {
    let workdir = TempDir::new().expect("create temp dir");
    std::fs::write(workdir.path().join("cloudaudit.toml"), "workers = 64\n")
        .expect("write config");

    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("dynamodb_single_region"))
        .args(["--service", "dynamodb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("workers must be between 1 and 16"));
}

#[test]
fn dynamo_alias_is_rejected() {
    let workdir = TempDir::new().expect("create temp dir");
    cloudaudit_cmd(&workdir)
        .arg("scan")
        .arg("--inventory")
        .arg(inventory("dynamodb_single_region"))
        .args(["--service", "dynamo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("did you mean 'dynamodb'"));
}
