//! Conversion from the loaded table into model inputs.
//!
//! Provides label encoding of the target column, extraction of a dense
//! feature matrix, and a simple Scaler for mean/std standardization used by
//! the linear models.

use ndarray::{Array1, Array2, Axis};

use crate::dataset::{format_number, Column, ColumnData, Dataset};
use crate::error::{PipelineError, Result};

/// Maps class labels to `0..n_classes`.
///
/// Classes are sorted numerically when every label is a number, otherwise
/// lexically, so the encoding is stable across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on a target column and return the encoder with the encoded labels.
    pub fn fit_transform(column: &Column) -> Result<(Self, Array1<usize>)> {
        if column.null_count() > 0 {
            return Err(PipelineError::InvalidArgument(format!(
                "target column '{}' has {} missing values",
                column.name,
                column.null_count()
            )));
        }
        let (classes, labels): (Vec<String>, Vec<String>) = match &column.data {
            ColumnData::Numeric(values) => {
                let mut distinct: Vec<f64> = values.iter().flatten().copied().collect();
                distinct.sort_by(|a, b| a.total_cmp(b));
                distinct.dedup();
                let classes = distinct.iter().map(|v| format_number(*v)).collect();
                let labels = values
                    .iter()
                    .flatten()
                    .map(|v| format_number(*v))
                    .collect();
                (classes, labels)
            }
            ColumnData::Text(values) => {
                let labels: Vec<String> = values.iter().flatten().cloned().collect();
                let mut classes = labels.clone();
                classes.sort();
                classes.dedup();
                (classes, labels)
            }
        };
        let encoder = LabelEncoder { classes };
        let encoded = labels
            .iter()
            .map(|label| encoder.encode(label))
            .collect::<Result<Vec<usize>>>()?;
        Ok((encoder, Array1::from_vec(encoded)))
    }

    pub fn from_classes(classes: Vec<String>) -> Self {
        LabelEncoder { classes }
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| PipelineError::InvalidArgument(format!("unknown class '{}'", label)))
    }

    /// Display name of an encoded class; falls back to the index.
    pub fn class_name(&self, index: usize) -> String {
        self.classes
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Dense `f64` matrix of the given table; every column must be numeric and
/// complete.
pub fn feature_matrix(data: &Dataset) -> Result<Array2<f64>> {
    let (n_rows, n_cols) = data.shape();
    let mut x = Array2::<f64>::zeros((n_rows, n_cols));
    for (c, column) in data.columns().iter().enumerate() {
        let values = column.as_numeric().ok_or_else(|| {
            PipelineError::Model(format!(
                "feature column '{}' is not numeric; encode it or drop it before modelling",
                column.name
            ))
        })?;
        if column.null_count() > 0 {
            return Err(PipelineError::Model(format!(
                "feature column '{}' has {} missing values; fill them before modelling",
                column.name,
                column.null_count()
            )));
        }
        for (r, value) in values.iter().flatten().enumerate() {
            x[(r, c)] = *value;
        }
    }
    Ok(x)
}

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-12;

    /// Fit from a matrix where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(PipelineError::InvalidArgument(
                "cannot fit a scaler on an empty matrix".to_string(),
            ));
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::InvalidArgument("empty matrix".to_string()))?;
        let std = x.std_axis(Axis(0), 0.0).mapv(|s| if s < Self::MIN_STD { 1.0 } else { s });
        Ok(Scaler { mean, std })
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn numeric_labels_sort_numerically() {
        let column = Column::numeric("y", vec![Some(10.0), Some(2.0), Some(10.0), Some(1.0)]);
        let (encoder, y) = LabelEncoder::fit_transform(&column).unwrap();
        assert_eq!(encoder.classes(), &["1.0", "2.0", "10.0"]);
        assert_eq!(y.to_vec(), vec![2, 1, 2, 0]);
    }

    #[test]
    fn text_labels_sort_lexically() {
        let column = Column::text(
            "y",
            vec![Some("b".into()), Some("a".into()), Some("c".into())],
        );
        let (encoder, y) = LabelEncoder::fit_transform(&column).unwrap();
        assert_eq!(encoder.n_classes(), 3);
        assert_eq!(y.to_vec(), vec![1, 0, 2]);
        assert_eq!(encoder.class_name(2), "c");
    }

    #[test]
    fn missing_target_rejected() {
        let column = Column::numeric("y", vec![Some(1.0), None]);
        assert!(LabelEncoder::fit_transform(&column).is_err());
    }

    #[test]
    fn feature_matrix_requires_numeric_complete_columns() {
        let ok = Dataset::from_columns(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(3.0), Some(4.0)]),
        ])
        .unwrap();
        assert_eq!(feature_matrix(&ok).unwrap(), array![[1.0, 3.0], [2.0, 4.0]]);

        let text = Dataset::from_columns(vec![Column::text("a", vec![Some("x".into())])]).unwrap();
        assert!(feature_matrix(&text).is_err());

        let holes = Dataset::from_columns(vec![Column::numeric("a", vec![None])]).unwrap();
        assert!(feature_matrix(&holes).is_err());
    }

    #[test]
    fn scaler_centers_and_keeps_constant_columns() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let sc = Scaler::fit(&x).unwrap();
        assert!((sc.mean[0] - 2.5).abs() < 1e-12);
        let t = sc.transform(&x);
        assert!(t.column(0).sum().abs() < 1e-12);
        assert!(t.column(1).iter().all(|v| *v == 0.0));
    }
}
