//! Descriptive analysis of a loaded table: shape, summary statistics,
//! correlations, z-score outliers and class distributions.
use std::path::{Path, PathBuf};

use crate::dataset::{format_number, format_table, Dataset};
use crate::error::Result;
use crate::error_handler::LogOnError;
use crate::report::plots;
use crate::stats;

/// `describe()`-style statistics of one numeric column. Statistics of a
/// column without values are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn of(name: &str, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q = |p: f64| {
            if sorted.is_empty() {
                f64::NAN
            } else {
                stats::quantile_sorted(&sorted, p)
            }
        };
        ColumnSummary {
            name: name.to_string(),
            count: values.len(),
            mean: stats::mean(values),
            std: stats::sample_std(values),
            min: q(0.0),
            q25: q(0.25),
            median: q(0.5),
            q75: q(0.75),
            max: q(1.0),
        }
    }

    fn cells(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

const SUMMARY_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

pub struct DataAnalyzer<'a> {
    data: &'a Dataset,
}

impl<'a> DataAnalyzer<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        DataAnalyzer { data }
    }

    /// Log the table shape and the type of every column.
    pub fn dataset_head_info(&self) -> (usize, usize) {
        let shape = self.data.shape();
        log::info!("Dataset shape: {:?}", shape);
        let dtypes = self
            .data
            .dtypes()
            .iter()
            .map(|(name, dtype)| format!("{:<40} {}", name, dtype))
            .collect::<Vec<_>>()
            .join("\n");
        log::info!("Column types:\n{}", dtypes);
        shape
    }

    /// Count, mean, sample std, min, quartiles and max of every numeric
    /// column, logged as one table.
    pub fn statistical_summary(&self) -> Vec<ColumnSummary> {
        let summaries: Vec<ColumnSummary> = self
            .data
            .numeric_columns()
            .iter()
            .map(|column| {
                let values = column.valid_numeric_values().unwrap_or_default();
                ColumnSummary::of(&column.name, &values)
            })
            .collect();

        let mut headers = vec![String::new()];
        headers.extend(summaries.iter().map(|s| s.name.clone()));
        let rows: Vec<Vec<String>> = SUMMARY_ROWS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let mut row = vec![label.to_string()];
                row.extend(summaries.iter().map(|s| format_stat(s.cells()[i])));
                row
            })
            .collect();
        log::info!(
            "Summary statistics of numeric columns:\n{}",
            format_table(&headers, &rows)
        );
        summaries
    }

    /// Pearson correlation between every pair of numeric columns over the
    /// rows where both are present.
    pub fn correlation_matrix(&self) -> (Vec<String>, Vec<Vec<f64>>) {
        let columns = self.data.numeric_columns();
        let names = columns.iter().map(|c| c.name.clone()).collect();
        let values: Vec<&[Option<f64>]> = columns.iter().filter_map(|c| c.as_numeric()).collect();
        let matrix = values
            .iter()
            .map(|a| values.iter().map(|b| stats::pearson(a, b)).collect())
            .collect();
        (names, matrix)
    }

    /// Write the correlation heatmap to `<output_dir>/correlation_matrix.html`.
    pub fn correlation_analysis(&self, output_dir: &Path) -> Result<PathBuf> {
        let context = "Failed to run correlation analysis";
        let (names, matrix) = self.correlation_matrix();
        std::fs::create_dir_all(output_dir).log_on_error(context)?;
        let path = output_dir.join("correlation_matrix.html");
        plots::save_plot(&plots::plot_correlation_heatmap(&names, &matrix), &path)
            .log_on_error(context)?;
        log::info!(
            "Correlation matrix over {} numeric columns written to {}",
            names.len(),
            path.display()
        );
        Ok(path)
    }

    /// Number of cells per numeric column whose z-score magnitude exceeds
    /// `threshold`. Columns with zero or undefined spread have none.
    pub fn detect_outliers(&self, threshold: f64) -> Vec<(String, usize)> {
        let counts: Vec<(String, usize)> = self
            .data
            .numeric_columns()
            .iter()
            .map(|column| {
                let values = column.valid_numeric_values().unwrap_or_default();
                (column.name.clone(), count_outliers(&values, threshold))
            })
            .collect();
        let listing = counts
            .iter()
            .map(|(name, count)| format!("{:<40} {}", name, count))
            .collect::<Vec<_>>()
            .join("\n");
        log::info!("Outliers per column (|z| > {}):\n{}", threshold, listing);
        counts
    }

    pub fn value_counts(&self, column: &str) -> Result<Vec<(String, usize)>> {
        Ok(self.data.column(column)?.value_counts())
    }

    /// Bar chart of the values of `column`, written to
    /// `<output_dir>/<column>_distribution.html`.
    pub fn plot_value_counts(&self, column: &str, output_dir: &Path) -> Result<PathBuf> {
        let context = format!("Failed to plot the distribution of {}", column);
        let counts = self.value_counts(column).log_on_error(&context)?;
        std::fs::create_dir_all(output_dir).log_on_error(&context)?;
        let path = output_dir.join(format!("{}_distribution.html", column));
        plots::save_plot(&plots::plot_value_counts(column, &counts), &path)
            .log_on_error(&context)?;
        log::info!("Distribution of {}: {:?}", column, counts);
        Ok(path)
    }
}

fn count_outliers(values: &[f64], threshold: f64) -> usize {
    let std = stats::sample_std(values);
    if !std.is_finite() || std == 0.0 {
        return 0;
    }
    let mean = stats::mean(values);
    values
        .iter()
        .filter(|v| ((*v - mean) / std).abs() > threshold)
        .count()
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{:.6}", value)
    }
}
