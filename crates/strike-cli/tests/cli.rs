//! Command-line integration tests.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn strike() -> Command {
    Command::cargo_bin("strike").unwrap()
}

#[test]
fn vanilla_prints_value() {
    strike()
        .args([
            "--format", "minimal", "vanilla", "--spot", "100", "--strike", "100", "--time", "1", "--rate", "0.05",
            "--dividend", "0.01", "--vol", "0.3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("13.616"));
}

#[test]
fn implied_vol_recovers_input() {
    let output = strike()
        .args([
            "--format", "minimal", "implied-vol", "--spot", "100", "--strike", "100", "--time", "1", "--rate", "0.05",
            "--dividend", "0.01", "--price", "13.616401",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let vol: f64 = String::from_utf8(output.stdout).unwrap().trim().parse().unwrap();
    assert!((vol - 0.30).abs() < 1e-5, "{vol}");
}

#[test]
fn bootstrap_reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
valuation_date = "2025-01-02"

[[swaps]]
tenor = "1Y"
rate = 0.035

[[swaps]]
tenor = "2Y"
rate = 0.04
"#
    )
    .unwrap();
    strike()
        .args(["--format", "json", "bootstrap"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"df\""));
}

#[test]
fn invalid_config_is_reported() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[tree]\nsteps = 1").unwrap();
    strike()
        .args(["vanilla", "--spot", "100", "--strike", "100", "--time", "1", "--vol", "0.2", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("pricing configuration"));
}

#[test]
fn missing_file_fails() {
    strike()
        .args(["surface", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}
