use std::path::PathBuf;

use anyhow::{Context, Result};

use dxcompare_classifiers::columns::COLUMN_RENAMES;
use dxcompare_classifiers::data_analyzer::DataAnalyzer;
use dxcompare_classifiers::data_loader::DataLoader;
use dxcompare_classifiers::dataset::Dataset;
use dxcompare_classifiers::models::factory::{build_all, build_named};
use dxcompare_classifiers::preprocessing::{feature_matrix, LabelEncoder};
use dxcompare_classifiers::{ClassifierEvaluator, EvaluationResult, SplitConfig};

use crate::config::PipelineConfig;

/// What a full run leaves behind.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub results: Vec<EvaluationResult>,
    pub best: Vec<EvaluationResult>,
    pub results_csv: PathBuf,
    pub report: PathBuf,
}

/// Load the table, describe it, then compare every configured classifier
/// on one seeded split.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    run_stages(config).context("Critical error in the main flow")
}

/// Load and describe the table without training anything.
pub fn run_analysis(config: &PipelineConfig) -> Result<Dataset> {
    let mut data = load(config)?;
    analyze(config, &data)?;
    drop_and_plot(config, &mut data)?;
    Ok(data)
}

fn run_stages(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let metric = config.metric()?;
    let data = run_analysis(config)?;

    let (features, target) = data
        .split_target(&config.target_column)
        .context("Failed to separate the target column")?;
    let x = feature_matrix(&features).context("Failed to build the feature matrix")?;
    let (encoder, y) = LabelEncoder::fit_transform(&target)?;
    log::info!(
        "Feature matrix: {} rows x {} columns, {} classes ({})",
        x.nrows(),
        x.ncols(),
        encoder.n_classes(),
        encoder.classes().join(", ")
    );

    let mut evaluator = ClassifierEvaluator::new(x, y, encoder, &config.output_dir)?
        .with_split(SplitConfig {
            test_size: config.test_size,
            seed: config.seed,
        })?
        .with_parallel(config.parallel);

    let mut classifiers = build_all(&config.classifiers);
    evaluator.evaluate(&mut classifiers)?;

    for ensemble in [&config.voting, &config.stacking].into_iter().flatten() {
        log::info!("Evaluating ensemble {}", ensemble.name);
        evaluator.evaluate(&mut [build_named(ensemble)])?;
    }

    let best = evaluator.best_by(metric);
    let results_csv = evaluator.write_results_csv()?;
    let report = evaluator.write_report(metric)?;

    Ok(PipelineOutcome {
        results: evaluator.results().to_vec(),
        best,
        results_csv,
        report,
    })
}

fn load(config: &PipelineConfig) -> Result<Dataset> {
    let mut loader = DataLoader::new();
    loader.load_csv(&config.input)?;
    loader.watch_data_head(5);

    if let Some(data) = loader.data_mut() {
        let renamed = data.rename_columns(&COLUMN_RENAMES);
        log::info!("Renamed {} column(s)", renamed);
    }

    if let Some(missing) = loader.count_missing_values() {
        let total: usize = missing.iter().map(|(_, n)| n).sum();
        log::info!("{} missing value(s) in total", total);
    }
    if let Some(strategy) = &config.fill_strategy {
        loader.fill_missing_values(strategy)?;
    }

    loader
        .into_data()
        .context("No data was loaded from the input file")
}

fn analyze(config: &PipelineConfig, data: &Dataset) -> Result<()> {
    let analyzer = DataAnalyzer::new(data);
    analyzer.dataset_head_info();
    analyzer.statistical_summary();
    analyzer.correlation_analysis(&config.output_dir)?;
    analyzer.detect_outliers(config.outlier_threshold);
    Ok(())
}

fn drop_and_plot(config: &PipelineConfig, data: &mut Dataset) -> Result<()> {
    let drop: Vec<&str> = config.drop_columns.iter().map(String::as_str).collect();
    data.drop_columns(&drop)
        .context("Failed to drop the excluded columns")?;
    log::info!("Dropped {} column(s), {} remain", drop.len(), data.n_cols());

    if let Some(column) = &config.distribution_column {
        DataAnalyzer::new(data).plot_value_counts(column, &config.output_dir)?;
    }
    Ok(())
}
