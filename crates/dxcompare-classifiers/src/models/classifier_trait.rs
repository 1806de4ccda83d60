use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};

/// Common contract for every model the evaluator can compare.
///
/// Labels are encoded class indices `0..n_classes`. Implementations must be
/// `Send` so a batch can be evaluated on the rayon pool.
pub trait Classifier: Send {
    /// Fit the model on a training matrix and its encoded labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict one encoded label per row. Errors when the model is unfitted.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Class membership probabilities, one column per class in
    /// `0..n_classes()`. Models without a probabilistic output return the
    /// one-hot encoding of [`Classifier::predict`].
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let labels = self.predict(x)?;
        Ok(one_hot(&labels, self.n_classes()))
    }

    /// Width of the label space seen at fit time; 0 before fitting.
    fn n_classes(&self) -> usize;

    /// A new unfitted model with the same hyper-parameters.
    fn fresh(&self) -> Box<dyn Classifier>;
}

/// A classifier together with the display name used in logs, artifacts and
/// results.
pub struct NamedClassifier {
    pub name: String,
    pub model: Box<dyn Classifier>,
}

impl NamedClassifier {
    pub fn new(name: impl Into<String>, model: impl Classifier + 'static) -> Self {
        NamedClassifier {
            name: name.into(),
            model: Box::new(model),
        }
    }

    pub fn boxed(name: impl Into<String>, model: Box<dyn Classifier>) -> Self {
        NamedClassifier {
            name: name.into(),
            model,
        }
    }

    /// Unfitted copy under the same name.
    pub fn fresh(&self) -> Self {
        NamedClassifier {
            name: self.name.clone(),
            model: self.model.fresh(),
        }
    }
}

impl std::fmt::Debug for NamedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedClassifier")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Reject empty or misaligned training input.
pub(crate) fn check_training_input(x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
    if x.nrows() == 0 {
        return Err(PipelineError::InvalidArgument(
            "cannot fit on an empty training set".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::InvalidArgument(format!(
            "feature matrix has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

pub(crate) fn not_fitted(model: &str) -> PipelineError {
    PipelineError::Model(format!("{} must be fitted before predicting", model))
}

/// Width of the label space covering every label in `y`.
pub(crate) fn label_width(y: &Array1<usize>) -> usize {
    y.iter().max().map(|m| m + 1).unwrap_or(0)
}

/// Sorted distinct labels present in `y`.
pub(crate) fn distinct_labels(y: &Array1<usize>) -> Vec<usize> {
    let mut labels = y.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels
}

pub fn one_hot(labels: &Array1<usize>, width: usize) -> Array2<f64> {
    let width = width.max(label_width(labels));
    let mut out = Array2::<f64>::zeros((labels.len(), width));
    for (row, label) in labels.iter().enumerate() {
        out[(row, *label)] = 1.0;
    }
    out
}

/// Index of the largest value in each row; the smallest index wins a tie.
pub fn argmax_rows(proba: &Array2<f64>) -> Array1<usize> {
    proba
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (i, v) in row.iter().enumerate() {
                if *v > row[best] {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// Widen a probability matrix with zero columns up to `width`.
pub(crate) fn pad_columns(proba: Array2<f64>, width: usize) -> Array2<f64> {
    if proba.ncols() >= width {
        return proba;
    }
    let mut out = Array2::<f64>::zeros((proba.nrows(), width));
    out.slice_mut(ndarray::s![.., ..proba.ncols()]).assign(&proba);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn one_hot_widens_to_largest_label() {
        let encoded = one_hot(&array![0, 2], 2);
        assert_eq!(encoded, array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn argmax_prefers_smallest_index_on_tie() {
        let proba = array![[0.5, 0.5], [0.1, 0.9], [0.4, 0.3]];
        assert_eq!(argmax_rows(&proba), array![0, 1, 0]);
    }

    #[test]
    fn pad_keeps_existing_columns() {
        let padded = pad_columns(array![[0.2, 0.8]], 3);
        assert_eq!(padded, array![[0.2, 0.8, 0.0]]);
    }

    #[test]
    fn training_input_checks() {
        let x = Array2::<f64>::zeros((2, 1));
        assert!(check_training_input(&x, &array![0, 1]).is_ok());
        assert!(check_training_input(&x, &array![0]).is_err());
        assert!(check_training_input(&Array2::zeros((0, 1)), &Array1::zeros(0)).is_err());
    }
}
