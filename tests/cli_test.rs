//! End-to-end tests for the mdl-explore binary
//!
//! Each test writes a small Malware Domain List style export into a temp
//! directory and runs the binary from there, so no stray config is picked up.

use std::path::Path;
use std::process::{Command, Output};

/// Seven rows survive cleaning; one placeholder row and one short line do not.
///
/// G scores against asn: zeus v1 trojan 5.01, worm 3.36, trojan 2.24.
const FIXTURE: &str = "\
2009/01/05_10:00,evil.ru/a.php,1.1.1.1,r1.example.net,Trojan,a@x.com,100,0,0
2009/01/06_10:00,EVIL.ru/b.php,1.1.1.2,r2.example.net,trojan,a@x.com,200,1,1
2009/01/07_10:00,worm.cn,1.1.1.3,r3.example.net,worm,b@x.com,100,0,0
2009/02/01_10:00,worm.cn/x,1.1.1.4,r4.example.net,worm,b@x.com,100,1,1
2009/02/02_10:00,worm2.cn,1.1.1.5,r5.example.net,worm,b@x.com,100,0,0
2009/02/03_10:00,-,1.1.1.6,r6.example.net,worm,b@x.com,100,0,0
bad,line
2009/03/01_10:00,zeus.com,1.1.1.7,r7.example.net,Zeus v1 Trojan,c@x.com,300,0,0
2009/03/02_10:00,zeus.com,1.1.1.8,r8.example.net,zeus v1 trojan,c@x.com,300,1,1
";

fn mdl_bin() -> &'static str {
    env!("CARGO_BIN_EXE_mdl-explore")
}

fn setup_data() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mdl_data.csv"), FIXTURE).unwrap();
    dir
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(mdl_bin())
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("MDL_EXPLORE_DATA")
        .arg("--data")
        .arg(dir.join("mdl_data.csv"))
        .args(args)
        .output()
        .expect("Failed to run mdl-explore")
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--format", "json"];
    full.extend_from_slice(args);
    let output = run_in(dir, &full);
    assert!(
        output.status.success(),
        "mdl-explore {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Invalid JSON")
}

fn ranked_categories(report: &serde_json::Value) -> Vec<String> {
    report["ranking"]["ranked"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["category"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// gtest
// ============================================================================

#[test]
fn test_gtest_ranks_most_associated_first() {
    let dir = setup_data();
    let report = run_json(dir.path(), &["gtest", "description", "asn", "--top", "2"]);

    assert_eq!(report["kind"], "g_test");
    assert_eq!(ranked_categories(&report), vec!["zeus v1 trojan", "worm"]);
    assert_eq!(report["ranking"]["total_records"], 7);
    assert_eq!(report["ranking"]["match_count"], 5);
}

#[test]
fn test_gtest_matches_limits_columns() {
    let dir = setup_data();
    let report = run_json(
        dir.path(),
        &["gtest", "description", "asn", "--top", "2", "--matches", "1"],
    );
    let columns = report["ranking"]["reduced"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0], "100");
    assert_eq!(
        report["ranking"]["full"]["columns"].as_array().unwrap().len(),
        2
    );
}

#[test]
fn test_gtest_reverse_and_min_volume() {
    let dir = setup_data();
    let report = run_json(dir.path(), &["gtest", "description", "asn", "--reverse"]);
    assert_eq!(
        ranked_categories(&report),
        vec!["trojan", "worm", "zeus v1 trojan"]
    );

    let report = run_json(
        dir.path(),
        &["gtest", "description", "asn", "--reverse", "--min-volume", "3"],
    );
    assert_eq!(ranked_categories(&report), vec!["worm"]);
}

#[test]
fn test_gtest_filter_drills_down() {
    let dir = setup_data();
    let report = run_json(
        dir.path(),
        &["gtest", "domain", "asn", "--filter", "description=Trojan"],
    );
    assert_eq!(ranked_categories(&report), vec!["evil.ru"]);
    assert_eq!(report["filters"][0], "description=trojan");
    let score = report["ranking"]["ranked"][0]["score"].as_f64().unwrap();
    assert!(score.abs() < 1e-9);
}

#[test]
fn test_gtest_unknown_column_fails() {
    let dir = setup_data();
    let output = run_in(dir.path(), &["gtest", "description", "asnx"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown column"));
}

#[test]
fn test_gtest_markdown_output_file() {
    let dir = setup_data();
    let out = dir.path().join("reports/gtest.md");
    let output = run_in(
        dir.path(),
        &[
            "--format",
            "md",
            "--output",
            out.to_str().unwrap(),
            "gtest",
            "description",
            "asn",
        ],
    );
    assert!(output.status.success());
    let md = std::fs::read_to_string(&out).unwrap();
    assert!(md.starts_with("# G-Test Association Ranking"));
    assert!(md.contains("| 1 | zeus v1 trojan |"));
    assert!(!md.contains('\u{1b}'), "markdown file must not contain ANSI codes");
}

// ============================================================================
// summary / clean
// ============================================================================

#[test]
fn test_summary_reports_cleaning_and_duplicate_columns() {
    let dir = setup_data();
    let report = run_json(dir.path(), &["summary"]);

    assert_eq!(report["kind"], "summary");
    assert_eq!(report["rows"], 7);
    assert_eq!(report["ingest"]["malformed"], 1);
    assert_eq!(report["cleaning"]["dropped_placeholder"], 1);
    assert_eq!(report["top_descriptions"][0][0], "worm");

    let redundant = report["redundant_columns"].as_array().unwrap();
    assert_eq!(redundant.len(), 1);
    assert_eq!(redundant[0]["a"], "country");
    assert_eq!(redundant[0]["b"], "inactive");
}

#[test]
fn test_summary_text_output() {
    let dir = setup_data();
    let output = run_in(dir.path(), &["summary"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dataset Summary"));
    assert!(stdout.contains("DUPLICATED COLUMNS"));
}

#[test]
fn test_clean_writes_normalized_csv() {
    let dir = setup_data();
    let out = dir.path().join("clean.csv");
    let output = run_in(dir.path(), &["clean", "--out", out.to_str().unwrap()]);
    assert!(output.status.success());

    let written = std::fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("date,domain,ip,reverse,description,registrant,asn,inactive,country")
    );
    assert_eq!(lines.count(), 7);
    assert!(written.contains(",evil.ru,"));
    assert!(!written.contains("a.php"));
    assert!(!written.contains("Trojan"));
}

// ============================================================================
// timeline / correlate
// ============================================================================

#[test]
fn test_timeline_series_and_totals() {
    let dir = setup_data();
    let report = run_json(dir.path(), &["timeline", "--series", "worm,trojan"]);

    assert_eq!(
        report["months"],
        serde_json::json!(["2009-01", "2009-02", "2009-03"])
    );
    assert_eq!(report["totals"], serde_json::json!([3, 2, 2]));
    assert_eq!(report["series"][0]["name"], "worm");
    assert_eq!(report["series"][0]["counts"], serde_json::json!([1, 2, 0]));
    assert_eq!(report["series"][1]["counts"], serde_json::json!([2, 0, 0]));
}

#[test]
fn test_timeline_top_uses_most_common() {
    let dir = setup_data();
    let report = run_json(dir.path(), &["timeline", "--top", "1"]);
    let series = report["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["name"], "worm");
}

#[test]
fn test_correlate_sorted_matrix() {
    let dir = setup_data();
    let report = run_json(dir.path(), &["correlate", "--series", "worm,trojan"]);
    assert_eq!(report["kind"], "correlation");
    assert_eq!(report["months"], 3);
    assert_eq!(report["matrix"]["names"], serde_json::json!(["trojan", "worm"]));
    assert_eq!(report["strongest"].as_array().unwrap().len(), 1);
}

#[test]
fn test_unknown_series_fails() {
    let dir = setup_data();
    let output = run_in(dir.path(), &["correlate", "--series", "worm,conficker"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("conficker"));
}

// ============================================================================
// config / misc
// ============================================================================

#[test]
fn test_config_file_supplies_defaults() {
    let dir = setup_data();
    std::fs::write(
        dir.path().join("mdl-explore.toml"),
        "[gtest]\ntop = 1\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["gtest", "description", "asn"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ranked_categories(&report), vec!["zeus v1 trojan"]);

    // Flags win over the file
    let report = run_json(dir.path(), &["gtest", "description", "asn", "--top", "3"]);
    assert_eq!(ranked_categories(&report).len(), 3);
}

#[test]
fn test_data_path_from_env() {
    let dir = setup_data();
    let output = Command::new(mdl_bin())
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("MDL_EXPLORE_DATA", dir.path().join("mdl_data.csv"))
        .args(["--format", "json", "summary"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rows"], 7);
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["summary"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load dataset"));
}

#[test]
fn test_init_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["init"]);
    assert!(output.status.success());
    assert!(dir.path().join("mdl-explore.toml").exists());

    let output = run_in(dir.path(), &["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
