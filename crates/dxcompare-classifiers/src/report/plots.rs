use std::path::Path;

use plotly::common::{ColorScale, ColorScalePalette};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, HeatMap, Plot};

use crate::error::Result;
use crate::metrics::ConfusionMatrix;

/// Heatmap of a confusion matrix; rows are true classes, columns predicted.
pub fn plot_confusion_matrix(cm: &ConfusionMatrix, class_names: &[String], title: &str) -> Plot {
    let z: Vec<Vec<f64>> = cm
        .counts()
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|c| *c as f64).collect())
        .collect();

    let trace = HeatMap::new(class_names.to_vec(), class_names.to_vec(), z)
        .color_scale(ColorScale::Palette(ColorScalePalette::Blues))
        .name("count");

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Predicted"))
        .y_axis(Axis::new().title("True"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Heatmap of a square correlation matrix. Undefined entries (`NaN`) are
/// left blank.
pub fn plot_correlation_heatmap(names: &[String], matrix: &[Vec<f64>]) -> Plot {
    let trace = HeatMap::new(names.to_vec(), names.to_vec(), matrix.to_vec())
        .color_scale(ColorScale::Palette(ColorScalePalette::RdBu))
        .name("correlation");

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().title("Correlation Matrix"));
    plot
}

/// Bar chart of how often each value of a column occurs.
pub fn plot_value_counts(column: &str, counts: &[(String, usize)]) -> Plot {
    let (values, totals): (Vec<String>, Vec<usize>) = counts.iter().cloned().unzip();
    let trace = Bar::new(values, totals).name(column);

    let layout = Layout::new()
        .title(format!("Distribution of {}", column).as_str())
        .x_axis(Axis::new().title(column))
        .y_axis(Axis::new().title("Count"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Write a figure as a standalone HTML page, replacing any existing file.
pub fn save_plot(plot: &Plot, path: &Path) -> Result<()> {
    std::fs::write(path, plot.to_html())?;
    log::debug!("Saved figure to {}", path.display());
    Ok(())
}

/// File name for an artifact named after `name`; path separators are
/// replaced so the file always lands in the output directory.
pub fn artifact_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.html", stem)
}
