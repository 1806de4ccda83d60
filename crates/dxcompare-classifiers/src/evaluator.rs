//! Uniform fit / predict / score loop over a list of named classifiers.
//!
//! Every classifier of every `evaluate` call sees the same train/test split:
//! the rows are shuffled with a seeded generator and the first
//! `ceil(test_size * n)` shuffled rows form the test set. Results accumulate
//! across calls in evaluation order.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use maud::html;
use ndarray::{Array1, Array2, Axis};
use plotly::Plot;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::error_handler::{log_and_raise, log_warning};
use crate::metrics::{ClassificationReport, ConfusionMatrix, Scores};
use crate::models::NamedClassifier;
use crate::preprocessing::LabelEncoder;
use crate::report::{plots, Report, ReportSection};

/// Metric used to rank evaluation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy,
    F1Score,
    Precision,
    Recall,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Accuracy => "Accuracy",
            Metric::F1Score => "F1 Score",
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = PipelineError;

    /// Accepts the display names as well as lower/snake case forms.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "accuracy" => Ok(Metric::Accuracy),
            "f1_score" | "f1" => Ok(Metric::F1Score),
            "precision" => Ok(Metric::Precision),
            "recall" => Ok(Metric::Recall),
            _ => Err(PipelineError::UnsupportedMetric(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub name: String,
    pub accuracy: f64,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
}

impl EvaluationResult {
    fn new(name: &str, scores: Scores) -> Self {
        EvaluationResult {
            name: name.to_string(),
            accuracy: scores.accuracy,
            f1_score: scores.f1,
            precision: scores.precision,
            recall: scores.recall,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::F1Score => self.f1_score,
            Metric::Precision => self.precision,
            Metric::Recall => self.recall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing, in `(0, 1)`.
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_size: 0.2,
            seed: 42,
        }
    }
}

struct SplitData {
    x_train: Array2<f64>,
    y_train: Array1<usize>,
    x_test: Array2<f64>,
    y_test: Array1<usize>,
}

pub struct ClassifierEvaluator {
    x: Array2<f64>,
    y: Array1<usize>,
    encoder: LabelEncoder,
    output_dir: PathBuf,
    split: SplitConfig,
    parallel: bool,
    results: Vec<EvaluationResult>,
    /// Confusion-matrix figure of each result, same order.
    figures: Vec<Plot>,
}

impl ClassifierEvaluator {
    /// Create an evaluator over a feature matrix and encoded labels. The
    /// output directory is created when absent.
    pub fn new(
        x: Array2<f64>,
        y: Array1<usize>,
        encoder: LabelEncoder,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::InvalidArgument(format!(
                "feature matrix has {} rows but the target has {}",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() < 2 {
            return Err(PipelineError::InvalidArgument(format!(
                "need at least two rows to split, got {}",
                x.nrows()
            )));
        }
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(ClassifierEvaluator {
            x,
            y,
            encoder,
            output_dir,
            split: SplitConfig::default(),
            parallel: false,
            results: Vec::new(),
            figures: Vec::new(),
        })
    }

    pub fn with_split(mut self, split: SplitConfig) -> Result<Self> {
        if !(split.test_size > 0.0 && split.test_size < 1.0) {
            return Err(PipelineError::InvalidArgument(format!(
                "test_size must be between 0 and 1, got {}",
                split.test_size
            )));
        }
        self.split = split;
        Ok(self)
    }

    /// Evaluate the classifiers of one batch concurrently.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Train and test row indices. Identical on every call.
    pub fn train_test_indices(&self) -> (Vec<usize>, Vec<usize>) {
        let n = self.x.nrows();
        let n_test = ((self.split.test_size * n as f64).ceil() as usize).clamp(1, n - 1);
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.split.seed);
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        (train, indices)
    }

    fn split_data(&self) -> SplitData {
        let (train, test) = self.train_test_indices();
        SplitData {
            x_train: self.x.select(Axis(0), &train),
            y_train: self.y.select(Axis(0), &train),
            x_test: self.x.select(Axis(0), &test),
            y_test: self.y.select(Axis(0), &test),
        }
    }

    /// Fit, predict and score each classifier in order, writing one
    /// confusion-matrix figure per classifier.
    ///
    /// The first failure is logged and returned; results of the classifiers
    /// before it are kept.
    ///
    /// In parallel mode only fitting and prediction run on the rayon pool;
    /// classifiers after a failed one are not started, and scoring and
    /// figures follow input order and stop at the failure.
    pub fn evaluate(&mut self, classifiers: &mut [NamedClassifier]) -> Result<()> {
        if classifiers.is_empty() {
            log_warning("No classifiers to evaluate.");
            return Ok(());
        }
        let data = self.split_data();
        log::info!(
            "Evaluating {} classifier(s) on {} train / {} test rows",
            classifiers.len(),
            data.y_train.len(),
            data.y_test.len()
        );

        if self.parallel {
            // index of the earliest failure so far; later classifiers are skipped
            let first_failure = AtomicUsize::new(usize::MAX);
            let predictions: Vec<Option<Result<Array1<usize>>>> = classifiers
                .par_iter_mut()
                .enumerate()
                .map(|(i, classifier)| {
                    if i > first_failure.load(Ordering::Relaxed) {
                        return None;
                    }
                    let prediction = fit_predict(classifier, &data);
                    if prediction.is_err() {
                        first_failure.fetch_min(i, Ordering::Relaxed);
                    }
                    Some(prediction)
                })
                .collect();
            // a skipped entry always follows a failure, which returns first
            for (classifier, prediction) in classifiers.iter().zip(predictions) {
                let Some(prediction) = prediction else { break };
                let outcome = prediction.and_then(|y_pred| {
                    score_one(
                        &classifier.name,
                        &data.y_test,
                        &y_pred,
                        &self.encoder,
                        &self.output_dir,
                    )
                });
                self.record(&classifier.name, outcome)?;
            }
        } else {
            for classifier in classifiers.iter_mut() {
                let outcome = fit_predict(classifier, &data).and_then(|y_pred| {
                    score_one(
                        &classifier.name,
                        &data.y_test,
                        &y_pred,
                        &self.encoder,
                        &self.output_dir,
                    )
                });
                self.record(&classifier.name, outcome)?;
            }
        }
        Ok(())
    }

    fn record(&mut self, name: &str, outcome: Result<(EvaluationResult, Plot)>) -> Result<()> {
        match outcome {
            Ok((result, figure)) => {
                self.results.push(result);
                self.figures.push(figure);
                Ok(())
            }
            Err(err) => Err(log_and_raise(
                err.for_classifier(name),
                &format!("Error while evaluating {}", name),
            )),
        }
    }

    /// All results sharing the highest value of `metric`, in evaluation
    /// order. Without results this only warns, before the metric name is
    /// looked at; otherwise unknown metric names are rejected.
    pub fn get_best_classifier(&self, metric: &str) -> Result<Vec<EvaluationResult>> {
        if self.results.is_empty() {
            log_warning("No results to select the best classifier from.");
            return Ok(Vec::new());
        }
        let metric: Metric = metric.parse()?;
        Ok(self.best_by(metric))
    }

    pub fn best_by(&self, metric: Metric) -> Vec<EvaluationResult> {
        if self.results.is_empty() {
            log_warning("No results to select the best classifier from.");
            return Vec::new();
        }
        let best_value = self
            .results
            .iter()
            .map(|r| r.metric(metric))
            .fold(f64::NEG_INFINITY, f64::max);
        let best: Vec<EvaluationResult> = self
            .results
            .iter()
            .filter(|r| r.metric(metric) == best_value)
            .cloned()
            .collect();
        for result in &best {
            log::info!(
                "Best classifier by {}: {} ({:.4})",
                metric,
                result.name,
                best_value
            );
        }
        best
    }

    /// Write every result to `<output_dir>/results.csv`.
    pub fn write_results_csv(&self) -> Result<PathBuf> {
        let path = self.output_dir.join("results.csv");
        let mut writer = csv::Writer::from_path(&path)?;
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush()?;
        log::info!("Wrote {} result(s) to {}", self.results.len(), path.display());
        Ok(path)
    }

    /// Write the HTML summary `<output_dir>/report.html` with every result,
    /// highlighting the best ones by `metric`, and the confusion matrices.
    pub fn write_report(&self, metric: Metric) -> Result<PathBuf> {
        let best: Vec<String> = self.best_by(metric).into_iter().map(|r| r.name).collect();

        let mut report = Report::new(
            "dxcompare",
            env!("CARGO_PKG_VERSION"),
            "Classifier Comparison Report",
        );

        let mut results_section = ReportSection::new("Results");
        results_section.add_content(html! {
            p {
                "Each classifier was fitted on the same training split and scored on the held-out rows. "
                "Precision, recall and F1 are support-weighted averages over the classes. "
                "Highlighted rows are the best by " (metric) "."
            }
            table {
                thead {
                    tr {
                        th { "Classifier" }
                        th { "Accuracy" }
                        th { "F1 Score" }
                        th { "Precision" }
                        th { "Recall" }
                        th { "Confusion matrix" }
                    }
                }
                tbody {
                    @for result in &self.results {
                        tr class=[best.contains(&result.name).then_some("best")] {
                            td { (result.name) }
                            td { (format!("{:.4}", result.accuracy)) }
                            td { (format!("{:.4}", result.f1_score)) }
                            td { (format!("{:.4}", result.precision)) }
                            td { (format!("{:.4}", result.recall)) }
                            td { a href=(plots::artifact_file_name(&result.name)) { "view" } }
                        }
                    }
                }
            }
        });
        report.add_section(results_section);

        let (train, test) = self.train_test_indices();
        let mut split_section = ReportSection::new("Split");
        split_section.add_content(html! {
            ul {
                li { "Training rows: " (train.len()) }
                li { "Test rows: " (test.len()) }
                li { "Seed: " (self.split.seed) }
                li { "Classes: " (self.encoder.classes().join(", ")) }
            }
        });
        report.add_section(split_section);

        if !self.figures.is_empty() {
            let mut figures_section = ReportSection::new("Confusion matrices");
            for figure in &self.figures {
                figures_section.add_plot(figure);
            }
            report.add_section(figures_section);
        }

        let path = self.output_dir.join("report.html");
        report.save_to_file(&path)?;
        log::info!("Wrote report to {}", path.display());
        Ok(path)
    }
}

/// Fit on the training rows and predict the test rows.
fn fit_predict(classifier: &mut NamedClassifier, data: &SplitData) -> Result<Array1<usize>> {
    log::debug!("Fitting {}", classifier.name);
    classifier.model.fit(&data.x_train, &data.y_train)?;
    let y_pred = classifier.model.predict(&data.x_test)?;
    if y_pred.len() != data.y_test.len() {
        return Err(PipelineError::Model(format!(
            "expected {} predictions, got {}",
            data.y_test.len(),
            y_pred.len()
        )));
    }
    Ok(y_pred)
}

/// Score the predictions, log the report and write the confusion-matrix
/// figure, which is also returned for the report.
fn score_one(
    name: &str,
    y_test: &Array1<usize>,
    y_pred: &Array1<usize>,
    encoder: &LabelEncoder,
    output_dir: &Path,
) -> Result<(EvaluationResult, Plot)> {
    let cm = ConfusionMatrix::new(&y_test.to_vec(), &y_pred.to_vec())?;
    let scores = Scores::from(&cm);
    log::info!(
        "Classification report for {}:\n{}",
        name,
        ClassificationReport::new(&cm, encoder)
    );

    let class_names: Vec<String> = cm.labels().iter().map(|l| encoder.class_name(*l)).collect();
    let figure = plots::plot_confusion_matrix(&cm, &class_names, &format!("Confusion Matrix: {}", name));
    plots::save_plot(&figure, &output_dir.join(plots::artifact_file_name(name)))?;

    log::info!(
        "{}: Accuracy={:.4}, F1 Score={:.4}, Precision={:.4}, Recall={:.4}",
        name,
        scores.accuracy,
        scores.f1,
        scores.precision,
        scores.recall
    );
    Ok((EvaluationResult::new(name, scores), figure))
}
