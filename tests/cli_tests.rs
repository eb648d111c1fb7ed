//! Integration tests for the inspcalc CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config, history and access key
fn inspcalc(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("inspcalc").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env("XDG_DATA_HOME", tmp.path().join("data"))
        .env_remove("INSPCALC_LEVEL")
        .env_remove("INSPCALC_DB")
        .env_remove("INSPCALC_ACCESS_KEY")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(tmp.path().join("history.db"));
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn assert_hours(value: &serde_json::Value, expected: f64) {
    let hours = value.as_f64().unwrap();
    assert!((hours - expected).abs() < 1e-9, "{} != {}", hours, expected);
}

// ============================================================================
// calc
// ============================================================================

#[test]
fn test_calc_single_order_table() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PO-001"))
        .stdout(predicate::str::contains("Total samples:"))
        .stdout(predicate::str::contains("5.25 h"))
        .stdout(predicate::str::contains("needs approval").not());
}

#[test]
fn test_calc_json_result() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(inspcalc(&tmp).args(["calc", "--po", "1000", "--format", "json"]));

    assert_eq!(json["total_samples"], 80);
    assert_hours(&json["total_hours"], 5.25);
    assert_eq!(json["exceeds_one_day"], false);
    assert_eq!(json["include_travel_time"], false);

    let order = &json["po_results"][0];
    assert_eq!(order["po_number"], "PO-001");
    assert_eq!(order["code_letter"], "J");
    assert_eq!(order["sample_size"], 80);
    assert_eq!(order["ac_major"], 3);
    assert_eq!(order["re_minor"], 8);
}

#[test]
fn test_calc_labels_and_functional_test() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(inspcalc(&tmp).args([
        "calc",
        "--po",
        "A-1:1000:S-3:5",
        "--po",
        "B-2:50",
        "--format",
        "json",
    ]));

    let orders = json["po_results"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["po_number"], "A-1");
    assert_eq!(orders[0]["functional_test_code_letter"], "D");
    assert_eq!(orders[0]["functional_test_sample_size"], 8);
    assert_eq!(orders[0]["functional_test_time_minutes"], 40.0);
    assert_eq!(orders[1]["po_number"], "B-2");
    assert!(orders[1].get("functional_test_sample_size").is_none());
}

#[test]
fn test_calc_csv_output() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000", "--po", "200", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "po_number,quantity,code_letter,sample_size",
        ))
        .stdout(predicate::str::contains("PO-001,1000,J,80,3,4,7,8"))
        .stdout(predicate::str::contains("PO-002,200,"));
}

#[test]
fn test_calc_markdown_report() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args([
            "calc",
            "--po",
            "1000",
            "--factory",
            "Plant 7",
            "--format",
            "md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plant 7"))
        .stdout(predicate::str::contains("| PO-001 | 1000 | J | 80 |"))
        .stdout(predicate::str::contains("**Total samples:**"));
}

#[test]
fn test_calc_explain() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("falls in 501-1200 -> code J"))
        .stdout(predicate::str::contains("code J -> sample 80 units"));
}

#[test]
fn test_calc_quiet_summary() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("80 samples, 5.25 h,"));
}

#[test]
fn test_calc_travel_included() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(inspcalc(&tmp).args([
        "calc",
        "--po",
        "1000",
        "--travel",
        "45",
        "--include-travel",
        "--format",
        "json",
    ]));
    assert_eq!(json["include_travel_time"], true);
    assert_hours(&json["total_hours"], 6.0);
}

#[test]
fn test_calc_long_visit_needs_approval() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "PO-1:1000:II:5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("needs approval"));
}

#[test]
fn test_calc_without_orders_fails() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .arg("calc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no purchase orders"));
}

#[test]
fn test_calc_zero_quantity_fails() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000", "--po", "X:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity 0"));
}

#[test]
fn test_calc_bad_order_spec_fails() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid order"));
}

#[test]
fn test_calc_unknown_level_rejected() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000", "--level", "III"])
        .assert()
        .failure();
}

#[test]
fn test_calc_orders_from_csv() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("orders.csv"),
        "po_number,quantity\nA,1000\nB,5000\n",
    )
    .unwrap();

    let json = json_stdout(inspcalc(&tmp).args([
        "calc",
        "--po-file",
        "orders.csv",
        "--format",
        "json",
    ]));
    let orders = json["po_results"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1]["po_number"], "B");
    assert_eq!(orders[1]["code_letter"], "L");
}

// ============================================================================
// plan
// ============================================================================

#[test]
fn test_plan_new_check_and_calc() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["plan", "new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan"));
    assert!(tmp.path().join("plan.yaml").exists());

    inspcalc(&tmp)
        .args(["plan", "new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    inspcalc(&tmp)
        .args(["plan", "check", "plan.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    let json = json_stdout(inspcalc(&tmp).args(["calc", "--file", "plan.yaml", "--format", "json"]));
    assert_eq!(json["po_results"][0]["po_number"], "PO-001");
    assert_eq!(json["total_samples"], 80);
}

#[test]
fn test_plan_check_reports_bad_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("plan.yaml"),
        "inspection_level: II\npos:\n  - po_number: A\n    quantity: 0\n",
    )
    .unwrap();

    inspcalc(&tmp)
        .args(["plan", "check", "plan.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity 0"));
}

// ============================================================================
// history and access
// ============================================================================

#[test]
fn test_save_requires_access_key() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["calc", "--po", "1000", "--save"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("PO-001"))
        .stderr(predicate::str::contains("access key is required"));
}

#[test]
fn test_history_round_trip() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args([
            "--access-key",
            "cei2024",
            "calc",
            "--po",
            "1000",
            "--save",
            "--name",
            "March visit",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved calculation"));

    let list = json_stdout(inspcalc(&tmp).args([
        "--access-key",
        "cei2024",
        "history",
        "list",
        "--format",
        "json",
    ]));
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["short_id"], "CALC@1");
    assert_eq!(rows[0]["name"], "March visit");
    assert_eq!(rows[0]["total_samples"], 80);

    let shown = json_stdout(inspcalc(&tmp).args([
        "--access-key",
        "cei2024",
        "history",
        "show",
        "CALC@1",
        "--format",
        "json",
    ]));
    assert_eq!(shown["custom_name"], "March visit");
    assert_eq!(shown["input"]["pos"][0]["quantity"], 1000);
    assert_hours(&shown["result"]["total_hours"], 5.25);

    inspcalc(&tmp)
        .args(["--access-key", "cei2024", "history", "rm", "CALC@1", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("elevated"));

    inspcalc(&tmp)
        .args(["--access-key", "ms2024", "history", "rm", "CALC@1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted CALC@1"));

    inspcalc(&tmp)
        .args(["--access-key", "ms2024", "history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved calculations."));
}

#[test]
fn test_history_clear() {
    let tmp = TempDir::new().unwrap();
    for qty in ["100", "200"] {
        inspcalc(&tmp)
            .args(["--access-key", "ms2024", "calc", "--po", qty, "--save", "-q"])
            .assert()
            .success();
    }

    inspcalc(&tmp)
        .args(["--access-key", "ms2024", "history", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 saved calculation(s)"));

    let list = json_stdout(inspcalc(&tmp).args([
        "--access-key",
        "ms2024",
        "history",
        "list",
        "--format",
        "json",
    ]));
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[test]
fn test_history_show_unknown_id() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["--access-key", "cei2024", "history", "show", "CALC@9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved calculation"));
}

#[test]
fn test_access_levels() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(inspcalc(&tmp).args(["--access-key", "ms2024", "access", "--format", "json"]));
    assert_eq!(json["capability"], "elevated");
    assert_eq!(json["can_delete"], true);

    inspcalc(&tmp)
        .args(["--access-key", "cei2024", "access", "-q"])
        .assert()
        .success()
        .stdout("standard\n");

    inspcalc(&tmp)
        .args(["--access-key", "guess", "access"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect access key"));
}

#[test]
fn test_access_honours_default_format() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["config", "set", "default_format", "json"])
        .assert()
        .success();

    let json = json_stdout(inspcalc(&tmp).args(["--access-key", "ms2024", "access"]));
    assert_eq!(json["capability"], "elevated");
    assert_eq!(json["can_delete"], true);
}

// ============================================================================
// tables, config, completions
// ============================================================================

#[test]
fn test_tables_lot_lookup() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(inspcalc(&tmp).args(["tables", "--lot", "1000", "--format", "json"]));
    assert_eq!(json["code_letter"], "J");
    assert_eq!(json["lot_min"], 501);
    assert_eq!(json["lot_max"], 1200);
    assert_eq!(json["sample_size"], 80);
    assert_eq!(json["aql_4_0"], serde_json::json!([7, 8]));
}

#[test]
fn test_tables_print() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("501 - 1200"))
        .stdout(predicate::str::contains("S-4"));
}

#[test]
fn test_config_set_show_unset() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["config", "set", "inspection_level", "S-4"])
        .assert()
        .success();
    assert!(tmp.path().join("inspcalc.yaml").exists());

    inspcalc(&tmp)
        .args(["config", "show", "inspection_level"])
        .assert()
        .success()
        .stdout("S-4\n");

    // 1000 at S-4 is code F
    let json = json_stdout(inspcalc(&tmp).args(["calc", "--po", "1000", "--format", "json"]));
    assert_eq!(json["po_results"][0]["code_letter"], "F");

    inspcalc(&tmp)
        .args(["config", "unset", "inspection_level"])
        .assert()
        .success();
    inspcalc(&tmp)
        .args(["config", "show", "inspection_level"])
        .assert()
        .failure();
}

#[test]
fn test_config_rejects_bad_values() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["config", "set", "aql_major", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
    inspcalc(&tmp)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
    assert!(!tmp.path().join("inspcalc.yaml").exists());
}

#[test]
fn test_config_set_keeps_malformed_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("inspcalc.yaml");
    let original = "report_time_minutes: 60\ntravel_time_minutes: [oops\n";
    fs::write(&path, original).unwrap();

    inspcalc(&tmp)
        .args(["config", "set", "aql_major", "4.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse config file"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);

    inspcalc(&tmp)
        .args(["config", "unset", "report_time_minutes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse config file"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_completions() {
    let tmp = TempDir::new().unwrap();
    inspcalc(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inspcalc"));
}
