use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_dataset-filter")
}

fn fixture() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/adsl.ndjson")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DATASET_FILTER_CONFIG")
        .output()
        .expect("command should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json_rows(output: &Output) -> Vec<serde_json::Value> {
    serde_json::from_str(&stdout(output)).expect("stdout should be a JSON array")
}

#[test]
fn test_filter_prints_matching_rows_as_table() {
    let output = run(&["filter", fixture(), "--where", r#"AGE > 80 and SEX = "M""#]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("USUBJID"), "missing header:\n{out}");
    assert!(out.contains("01-701-1115"));
    assert!(out.contains("01-701-1130"));
    assert!(!out.contains("01-701-1047"));
    assert!(
        stderr(&output).contains(r#"Matched 2 of 12 rows with filter: AGE > 80 and SEX = "M""#),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_filter_json_output_written_to_file() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("rows.json");

    let output = run(&[
        "-F",
        "json",
        "-o",
        out.to_str().expect("utf8 path"),
        "filter",
        fixture(),
        "-w",
        r#"ARM ? "High""#,
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let rows = json_rows(&output);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["USUBJID"], "01-701-1028");
    assert_eq!(rows[0]["AGE"], 71.0);
    assert_eq!(rows[2]["RACE"], "");

    let written = fs::read_to_string(&out).expect("output file should exist");
    let from_file: Vec<serde_json::Value> =
        serde_json::from_str(&written).expect("output file should hold JSON");
    assert_eq!(from_file, rows);
}

#[test]
fn test_filter_case_insensitive_and_limit() {
    let output = run(&[
        "-F",
        "json",
        "filter",
        fixture(),
        "--where",
        r#"SEX = "m""#,
        "--case-insensitive",
        "--limit",
        "2",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_rows(&output).len(), 2);
    assert!(stderr(&output).contains("Matched 7 of 12 rows"));
}

#[test]
fn test_strict_names_reject_wrong_case() {
    let output = run(&["filter", fixture(), "--where", "age > 1", "--strict-names"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("Variable age not found"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_quiet_suppresses_summary() {
    let output = run(&["-q", "-F", "json", "filter", fixture(), "--where", "AGE < 60"]);
    assert!(output.status.success());
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));
    assert_eq!(json_rows(&output).len(), 1);
}

#[test]
fn test_config_limits_rows_and_sets_format() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("filter.toml");
    write_file(&config, "[output]\nformat = \"json\"\nmax_rows = 1\n");

    let output = run(&[
        "--config",
        config.to_str().expect("utf8 path"),
        "filter",
        fixture(),
        "--where",
        r#"RACE = "WHITE""#,
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_rows(&output).len(), 1);
}

#[test]
fn test_validate_reports_status() {
    let output = run(&["validate", fixture(), "--where", r#"RACE in ("WHITE") and AGE >= 18"#]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "valid");

    let output = run(&["validate", fixture(), "--where", r#"AGE > "old""#]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim(), "invalid");
}

#[test]
fn test_parse_prints_structured_filter() {
    let output = run(&[
        "parse",
        fixture(),
        "--where",
        r#"age in (81, 84) or missing(race)"#,
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("JSON output");
    assert_eq!(value["connectors"], serde_json::json!(["or"]));
    assert_eq!(value["conditions"][0]["variable"], "AGE");
    assert_eq!(value["conditions"][0]["operator"], "in");
    assert_eq!(value["conditions"][1]["variable"], "RACE");
    assert_eq!(value["conditions"][1]["isFunction"], true);
}

#[test]
fn test_format_renders_structured_filter() {
    let dir = tempdir().expect("temp dir");
    let filter = dir.path().join("filter.json");
    write_file(
        &filter,
        r#"{"conditions":[{"variable":"age","operator":"in","value":[25,30]},{"variable":"sex","operator":"missing","isFunction":true}],"connectors":["and"]}"#,
    );

    let output = run(&["format", filter.to_str().expect("utf8 path")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "age in (25, 30) and missing(sex)");
}

#[test]
fn test_format_rejects_unknown_connector() {
    let dir = tempdir().expect("temp dir");
    let filter = dir.path().join("filter.json");
    write_file(
        &filter,
        r#"{"conditions":[{"variable":"a","operator":"eq","value":1},{"variable":"b","operator":"eq","value":2}],"connectors":["orMaybe"]}"#,
    );

    let output = run(&["format", filter.to_str().expect("utf8 path")]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("orMaybe"), "stderr: {}", stderr(&output));
}

#[test]
fn test_columns_lists_filter_types() {
    let output = run(&["-F", "json", "columns", fixture()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let columns: Vec<serde_json::Value> =
        serde_json::from_str(&stdout(&output)).expect("JSON output");
    assert_eq!(columns.len(), 8);
    assert_eq!(
        columns[1],
        serde_json::json!({"name": "AGE", "dataType": "number"})
    );
    assert_eq!(columns[6]["dataType"], "string");
    assert_eq!(columns[7]["dataType"], "boolean");
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("absent.ndjson");
    let output = run(&["columns", missing.to_str().expect("utf8 path")]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("Failed to load dataset"),
        "stderr: {}",
        stderr(&output)
    );
}
