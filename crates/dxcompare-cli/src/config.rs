use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use dxcompare_classifiers::columns::{DISTRIBUTION_COLUMN, EXCLUDED_COLUMNS, TARGET_COLUMN};
use dxcompare_classifiers::config::{
    default_classifiers, default_stacking, default_voting, ModelSpec, ModelType,
};
use dxcompare_classifiers::data_loader::ImputeStrategy;
use dxcompare_classifiers::Metric;

/// Parameters of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub target_column: String,
    /// Columns removed after the analysis stage, before modelling.
    pub drop_columns: Vec<String>,
    /// Column whose value distribution is plotted; skipped when `None`.
    pub distribution_column: Option<String>,
    /// `mean`, `median` or `most_frequent`; missing values are kept when
    /// `None`.
    pub fill_strategy: Option<String>,
    pub outlier_threshold: f64,
    pub test_size: f64,
    pub seed: u64,
    pub best_metric: String,
    pub parallel: bool,
    pub classifiers: Vec<ModelSpec>,
    pub voting: Option<ModelSpec>,
    pub stacking: Option<ModelSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::from("data/schizophrenia_dataset.csv"),
            output_dir: PathBuf::from("public"),
            log_file: PathBuf::from("app.log"),
            target_column: TARGET_COLUMN.to_string(),
            drop_columns: EXCLUDED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            distribution_column: Some(DISTRIBUTION_COLUMN.to_string()),
            fill_strategy: None,
            outlier_threshold: 3.0,
            test_size: 0.2,
            seed: 42,
            best_metric: Metric::Accuracy.to_string(),
            parallel: false,
            classifiers: default_classifiers(),
            voting: Some(default_voting()),
            stacking: Some(default_stacking()),
        }
    }
}

/// Load a pipeline configuration from a JSON file. Missing fields take their
/// default values.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: PipelineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

impl PipelineConfig {
    /// Resolve the configuration of a `run` or `analyze` invocation: the
    /// JSON file when given, defaults otherwise, then command line overrides.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => load_config(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = matches.get_one::<PathBuf>("input") {
            config.input = input.clone();
        }
        if let Some(output_dir) = matches.get_one::<PathBuf>("output_dir") {
            config.output_dir = output_dir.clone();
        }
        if let Some(log_file) = matches.get_one::<PathBuf>("log_file") {
            config.log_file = log_file.clone();
        }
        if let Some(fill) = matches.get_one::<String>("fill") {
            config.fill_strategy = Some(fill.clone());
        }
        if let Some(metric) = try_get::<String>(matches, "metric") {
            config.best_metric = metric;
        }
        if let Some(seed) = try_get::<u64>(matches, "seed") {
            config.seed = seed;
        }
        if let Some(test_size) = try_get::<f64>(matches, "test_size") {
            config.test_size = test_size;
        }
        if let Some(models) = try_get::<String>(matches, "models") {
            config.classifiers = parse_model_list(&models)?;
        }
        if matches!(matches.try_get_one::<bool>("parallel"), Ok(Some(true))) {
            config.parallel = true;
        }
        if matches!(matches.try_get_one::<bool>("no_ensembles"), Ok(Some(true))) {
            config.voting = None;
            config.stacking = None;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail deep inside the run.
    pub fn validate(&self) -> Result<()> {
        if let Some(strategy) = &self.fill_strategy {
            ImputeStrategy::from_str(strategy)?;
        }
        Metric::from_str(&self.best_metric)?;
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            anyhow::bail!("test_size must be between 0 and 1, got {}", self.test_size);
        }
        if self.outlier_threshold <= 0.0 {
            anyhow::bail!(
                "outlier_threshold must be positive, got {}",
                self.outlier_threshold
            );
        }
        Ok(())
    }

    pub fn metric(&self) -> Result<Metric> {
        Ok(Metric::from_str(&self.best_metric)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Arguments that only some subcommands define.
fn try_get<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}

/// Parse a comma separated list of model names (`knn,decision_tree,...`)
/// into specs with default hyper-parameters.
pub fn parse_model_list(list: &str) -> Result<Vec<ModelSpec>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let model = ModelType::from_str(name)?;
            Ok(ModelSpec::of(model))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_dataset_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_column, "Diagnosis");
        assert_eq!(config.drop_columns.len(), 12);
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn model_list_parsing() {
        let specs = parse_model_list("knn, decision_tree,,dummy").unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["K Neighbors", "Decision Tree", "Dummy"]);
        assert!(parse_model_list("catboost").is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = PipelineConfig::default();
        config.fill_strategy = Some("bogus".to_string());
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.best_metric = "AUC".to_string();
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.test_size = 0.0;
        assert!(config.validate().is_err());
    }
}
