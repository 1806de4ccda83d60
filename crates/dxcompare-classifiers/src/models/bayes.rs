use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_bayes::GaussianNb;
use ndarray::{Array1, Array2};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{check_training_input, label_width, not_fitted, Classifier};

/// Gaussian naive Bayes; fills the per-class Gaussian likelihood role.
pub struct GaussianNbClassifier {
    var_smoothing: f64,
    model: Option<GaussianNb<f64, usize>>,
    n_classes: usize,
}

impl GaussianNbClassifier {
    pub fn new(var_smoothing: f64) -> Self {
        GaussianNbClassifier {
            var_smoothing,
            model: None,
            n_classes: 0,
        }
    }
}

impl Default for GaussianNbClassifier {
    fn default() -> Self {
        GaussianNbClassifier::new(1e-9)
    }
}

impl Classifier for GaussianNbClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        let dataset = Dataset::new(x.clone(), y.clone());
        let model = GaussianNb::params()
            .var_smoothing(self.var_smoothing)
            .fit(&dataset)
            .map_err(PipelineError::model)?;
        self.model = Some(model);
        self.n_classes = label_width(y);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| not_fitted("Gaussian naive Bayes"))?;
        Ok(model.predict(x))
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(GaussianNbClassifier::new(self.var_smoothing))
    }
}
