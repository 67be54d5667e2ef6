use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const METERS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/meters.json");

fn meterwise() -> Command {
    let mut cmd = Command::cargo_bin("meterwise").unwrap();
    cmd.env_remove("METERWISE_CONFIG").env_remove("RUST_LOG");
    cmd
}

// ============================================================
// status
// ============================================================

#[test]
fn test_status_all_meters() {
    meterwise()
        .args(["status", METERS, "--at", "2026-02-09T10:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "A\tPAID\tPaid parking until 18:00, 120 min limit",
        ))
        .stdout(predicate::str::contains("D\tUNKNOWN\tNo schedule data available"))
        .stdout(predicate::str::contains("E\tFREE\tFree parking"));
}

#[test]
fn test_status_single_meter_tow_away() {
    meterwise()
        .args(["status", METERS, "--post-id", "A", "--at", "2026-02-09T08:00"])
        .assert()
        .success()
        .stdout("A\tTOW_AWAY\tTow-away zone until 09:00\n");
}

#[test]
fn test_status_weekend_lookahead() {
    // 2026-02-07 is a Saturday; A only enforces on weekdays. Days ahead
    // report the first rule posted for that day, not the earliest.
    meterwise()
        .args(["status", METERS, "--post-id", "A", "--at", "2026-02-07T12:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Free until Monday at 09:00"));
}

#[test]
fn test_status_unknown_post_id() {
    meterwise()
        .args(["status", METERS, "--post-id", "Z"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no meter with post id 'Z'"));
}

#[test]
fn test_status_json() {
    let output = meterwise()
        .args(["status", METERS, "--json", "--at", "2026-02-09T07:30"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["post_id"], "A");
    assert_eq!(rows[0]["status"], "TOW_AWAY");
    assert_eq!(rows[0]["rule"]["meter_state"], "Tow-away");
    assert_eq!(rows[1]["status"], "FREE");
    assert_eq!(rows[1]["message"], "Free until 09:00");
    assert_eq!(rows[1]["next_change"]["at"], "09:00");
    assert_eq!(rows[1]["next_change"]["days_ahead"], 0);
    assert_eq!(rows[3]["status"], "UNKNOWN");
}

#[test]
fn test_invalid_at_is_usage_error() {
    meterwise()
        .args(["status", METERS, "--at", "next tuesday"])
        .assert()
        .code(2);
}

// ============================================================
// nearest
// ============================================================

#[test]
fn test_nearest_skips_tow_away() {
    meterwise()
        .args([
            "nearest",
            METERS,
            "--lat",
            "37.7749",
            "--lon",
            "-122.4194",
            "--at",
            "2026-02-09T08:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("TOW_AWAY").not())
        .stdout(predicate::str::starts_with("   100 m\tB\tFREE\tFree until 09:00"));
}

#[test]
fn test_nearest_any_with_limit() {
    meterwise()
        .args([
            "nearest",
            METERS,
            "--lat",
            "37.7749",
            "--lon",
            "-122.4194",
            "--at",
            "2026-02-09T08:00",
            "--availability",
            "any",
            "-n",
            "1",
        ])
        .assert()
        .success()
        .stdout("     0 m\tA\tTOW_AWAY\tTow-away zone until 09:00\n");
}

#[test]
fn test_nearest_free_only_json() {
    let output = meterwise()
        .args([
            "nearest",
            METERS,
            "--json",
            "--lat",
            "37.7749",
            "--lon",
            "-122.4194",
            "--at",
            "2026-02-09T10:00",
            "--availability",
            "free",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["post_id"], "E");
    assert_eq!(rows[0]["message"], "Free parking");
}

#[test]
fn test_nearest_max_distance_with_no_hits() {
    meterwise()
        .args([
            "nearest",
            METERS,
            "--lat",
            "37.7749",
            "--lon",
            "-122.4194",
            "--at",
            "2026-02-09T08:00",
            "--max-distance",
            "50",
        ])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("no parkable meters found"));
}

#[test]
fn test_nearest_bad_availability() {
    meterwise()
        .args([
            "nearest",
            METERS,
            "--lat",
            "0",
            "--lon",
            "0",
            "--availability",
            "sometimes",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_nearest_limit_from_config() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "limit = 1").unwrap();
    let output = meterwise()
        .args([
            "nearest",
            METERS,
            "--lat",
            "37.7749",
            "--lon",
            "-122.4194",
            "--at",
            "2026-02-09T08:00",
        ])
        .arg("--config")
        .arg(config.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_bad_config_is_usage_error() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "limit = \"many\"").unwrap();
    meterwise()
        .args(["check", METERS])
        .env("METERWISE_CONFIG", config.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid config"));
}

// ============================================================
// cluster / check
// ============================================================

#[test]
fn test_cluster_groups_same_schedule_neighbours() {
    meterwise()
        .args(["cluster", METERS])
        .assert()
        .success()
        .stdout(predicate::str::contains("C00001\t2 meters"))
        .stdout(predicate::str::contains("MARKET ST"))
        .stdout(predicate::str::contains("C00004"));
}

#[test]
fn test_cluster_json() {
    let output = meterwise()
        .args(["cluster", METERS, "--json", "--radius-m", "20"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let clusters: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(clusters[0]["post_ids"], serde_json::json!(["A", "C"]));
    assert_eq!(clusters[0]["schedule"].as_array().unwrap().len(), 2);
    assert_eq!(clusters[0]["signature"].as_str().unwrap().len(), 64);
}

#[test]
fn test_check_reports_skipped_rules() {
    meterwise()
        .args(["check", METERS])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 meters, 5 rules, 1 skipped"))
        .stderr(predicate::str::contains("E: 1 rule(s)"));
}

// ============================================================
// Errors
// ============================================================

#[test]
fn test_missing_file() {
    meterwise()
        .args(["check", "/nonexistent/meters.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: I/O error"));
}

#[test]
fn test_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{\"post_id\": ").unwrap();
    meterwise()
        .arg("check")
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid meter data"));
}

#[test]
fn test_no_subcommand() {
    meterwise().assert().code(2);
}

#[test]
fn test_version_flag() {
    meterwise()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("meterwise"));
}
