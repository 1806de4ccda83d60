//! Integration tests for pipeline config parsing and logging setup.

use std::path::PathBuf;

use dxcompare_cli::config::{load_config, PipelineConfig};
use dxcompare_cli::logging::init_logging;

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

#[test]
fn default_config_lists_every_model_family() {
    let config = PipelineConfig::default();
    let names: Vec<&str> = config.classifiers.iter().map(|s| s.name.as_str()).collect();
    for expected in [
        "Gradient Boosting",
        "Decision Tree",
        "K Neighbors",
        "Gaussian Naive Bayes",
        "Logistic Regression",
        "Dummy",
    ] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
    assert_eq!(config.voting.as_ref().unwrap().name, "Voting (Soft)");
    assert_eq!(config.stacking.as_ref().unwrap().name, "Stacking");
    assert_eq!(config.seed, 42);
    assert!((config.test_size - 0.2).abs() < 1e-12);
}

#[test]
fn config_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = PipelineConfig {
        seed: 7,
        fill_strategy: Some("median".to_string()),
        distribution_column: None,
        ..PipelineConfig::default()
    };
    std::fs::write(&path, config.to_json().unwrap()).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn partial_config_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "input": "data/other.csv",
            "parallel": true,
            "classifiers": [
                { "name": "Shallow Tree", "DecisionTree": { "max_depth": 2 } },
                { "name": "Coin", "Dummy": { "strategy": "uniform", "seed": 1 } }
            ]
        }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.input, PathBuf::from("data/other.csv"));
    assert!(config.parallel);
    assert_eq!(config.classifiers.len(), 2);
    assert_eq!(config.classifiers[0].name, "Shallow Tree");
    assert_eq!(config.output_dir, PathBuf::from("public"));
    assert_eq!(config.target_column, "Diagnosis");
    assert!(config.voting.is_some());
}

#[test]
fn malformed_config_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.json"));
}

#[test]
fn missing_config_errors() {
    assert!(load_config("/nonexistent/path/config.json").is_err());
}

// ---------------------------------------------------------------------------
// init_logging
// ---------------------------------------------------------------------------

#[test]
fn init_logging_creates_nested_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("run.log");
    {
        let _guard = init_logging(&path).unwrap();
        log::info!("hello from the test");
    }
    assert!(path.exists());
}
