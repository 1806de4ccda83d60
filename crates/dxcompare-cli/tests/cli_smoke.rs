//! CLI binary smoke tests using assert_cmd.
//!
//! These tests run the compiled `dxcompare` binary against small generated
//! tables to check argument parsing, error exits and the files a run leaves
//! behind.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

use dxcompare_cli::config::{parse_model_list, PipelineConfig};

fn cmd() -> Command {
    Command::cargo_bin("dxcompare").unwrap()
}

/// 40 rows, two informative features, a distribution column and a binary
/// diagnosis.
fn write_table(path: &Path) {
    let mut csv = String::from("Age,Score,Suicide_Attempts,Diagnosis\n");
    for row in 0..40 {
        let diagnosis = row % 2;
        let age = 20 + row + diagnosis * 30;
        let score = if diagnosis == 1 { 8.5 } else { 1.5 } + (row % 5) as f64 * 0.1;
        let attempts = row % 3;
        csv.push_str(&format!("{},{},{},{}\n", age, score, attempts, diagnosis));
    }
    std::fs::write(path, csv).unwrap();
}

fn write_config(dir: &Path, config: &PipelineConfig) -> std::path::PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, config.to_json().unwrap()).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("analyze"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dxcompare"));
}

// ---------------------------------------------------------------------------
// config subcommand
// ---------------------------------------------------------------------------

#[test]
fn config_prints_default_template() {
    cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"classifiers\""))
        .stdout(predicate::str::contains("Diagnosis"));
}

// ---------------------------------------------------------------------------
// run subcommand
// ---------------------------------------------------------------------------

#[test]
fn run_with_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["run", "--input", "does_not_exist.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does_not_exist.csv"));
}

#[test]
fn run_rejects_unknown_fill_strategy() {
    cmd()
        .args(["run", "--fill", "mode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn run_rejects_unknown_model_name() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["run", "--models", "knn,catboost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catboost"));
}

#[test]
fn run_end_to_end_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("table.csv");
    write_table(&input);
    let output = dir.path().join("public");

    let config = PipelineConfig {
        input: input.clone(),
        output_dir: output.clone(),
        log_file: dir.path().join("logs").join("app.log"),
        drop_columns: vec![],
        voting: None,
        stacking: None,
        classifiers: parse_model_list("decision_tree,knn,dummy").unwrap(),
        ..PipelineConfig::default()
    };
    let config_path = write_config(dir.path(), &config);

    cmd()
        .arg("run")
        .arg(&config_path)
        .assert()
        .success();

    let results = std::fs::read_to_string(output.join("results.csv")).unwrap();
    let mut lines = results.lines();
    assert_eq!(
        lines.next(),
        Some("name,accuracy,f1_score,precision,recall")
    );
    let names: Vec<&str> = lines.map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(names, vec!["Decision Tree", "K Neighbors", "Dummy"]);

    for artifact in [
        "report.html",
        "correlation_matrix.html",
        "Suicide_Attempts_distribution.html",
        "Decision Tree.html",
        "K Neighbors.html",
        "Dummy.html",
    ] {
        assert!(output.join(artifact).exists(), "missing {}", artifact);
    }

    let log = std::fs::read_to_string(dir.path().join("logs").join("app.log")).unwrap();
    assert!(log.contains("Dummy: Accuracy="));
    assert!(log.contains(" - INFO - "));
    // the table head is logged once per run
    assert_eq!(log.matches("First 5 rows:").count(), 1);
    assert!(!log.contains("First rows:"));
}

#[test]
fn run_arguments_override_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("table.csv");
    write_table(&input);

    let config = PipelineConfig {
        input: dir.path().join("elsewhere.csv"),
        drop_columns: vec![],
        distribution_column: None,
        ..PipelineConfig::default()
    };
    let config_path = write_config(dir.path(), &config);

    cmd()
        .current_dir(dir.path())
        .arg("run")
        .arg(&config_path)
        .arg("--input")
        .arg(&input)
        .args(["--output-dir", "out", "--models", "dummy", "--no-ensembles"])
        .args(["--metric", "F1 Score", "--seed", "7"])
        .assert()
        .success();

    let results = std::fs::read_to_string(dir.path().join("out").join("results.csv")).unwrap();
    assert_eq!(results.lines().count(), 2);
    assert!(!dir.path().join("out").join("Suicide_Attempts_distribution.html").exists());
    assert!(dir.path().join("app.log").exists());
}

#[test]
fn run_with_missing_drop_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("table.csv");
    write_table(&input);

    // Default configuration drops columns this table does not have.
    cmd()
        .current_dir(dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Critical error in the main flow"));
}

// ---------------------------------------------------------------------------
// analyze subcommand
// ---------------------------------------------------------------------------

#[test]
fn analyze_writes_plots_without_training() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("table.csv");
    write_table(&input);

    let config = PipelineConfig {
        input,
        output_dir: dir.path().join("public"),
        log_file: dir.path().join("app.log"),
        drop_columns: vec!["Age".to_string()],
        ..PipelineConfig::default()
    };
    let config_path = write_config(dir.path(), &config);

    cmd()
        .args(["analyze"])
        .arg(&config_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Analysis finished on 40 rows x 3 columns"));

    let public = dir.path().join("public");
    assert!(public.join("correlation_matrix.html").exists());
    assert!(public.join("Suicide_Attempts_distribution.html").exists());
    assert!(!public.join("results.csv").exists());
}
