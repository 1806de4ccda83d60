use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{
    argmax_rows, check_training_input, distinct_labels, label_width, not_fitted, Classifier,
};
use crate::preprocessing::Scaler;

/// Multinomial logistic regression with L2 penalty `alpha` on standardized
/// inputs.
pub struct LogisticRegressionClassifier {
    max_iterations: u64,
    alpha: f64,
    fitted: Option<(Scaler, MultiFittedLogisticRegression<f64, usize>)>,
    n_classes: usize,
}

impl LogisticRegressionClassifier {
    pub fn new(max_iterations: u64, alpha: f64) -> Self {
        LogisticRegressionClassifier {
            max_iterations,
            alpha,
            fitted: None,
            n_classes: 0,
        }
    }
}

impl Default for LogisticRegressionClassifier {
    fn default() -> Self {
        LogisticRegressionClassifier::new(100, 1.0)
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        if distinct_labels(y).len() < 2 {
            return Err(PipelineError::Model(
                "logistic regression needs at least two classes in the training data".to_string(),
            ));
        }
        let scaler = Scaler::fit(x)?;
        let dataset = Dataset::new(scaler.transform(x), y.clone());
        let model = MultiLogisticRegression::default()
            .alpha(self.alpha)
            .max_iterations(self.max_iterations)
            .fit(&dataset)
            .map_err(PipelineError::model)?;
        self.fitted = Some((scaler, model));
        self.n_classes = label_width(y);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (scaler, model) = self
            .fitted
            .as_ref()
            .ok_or_else(|| not_fitted("Logistic regression"))?;
        let fitted_proba = model.predict_probabilities(&scaler.transform(x));

        // columns follow the model's own class order
        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (col, class) in model.classes().iter().enumerate() {
            proba.column_mut(*class).assign(&fitted_proba.column(col));
        }
        Ok(proba)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(LogisticRegressionClassifier::new(
            self.max_iterations,
            self.alpha,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    #[test]
    fn probabilities_sum_to_one() {
        let x = array![[0.0], [0.5], [1.0], [5.0], [5.5], [6.0], [10.0], [10.5], [11.0]];
        let y = array![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let mut model = LogisticRegressionClassifier::default();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 3);
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-6);
        }
        let pred = model.predict(&array![[0.0], [11.0]]).unwrap();
        assert_eq!(pred, array![0, 2]);
    }

    #[test]
    fn single_class_is_rejected() {
        let mut model = LogisticRegressionClassifier::default();
        assert!(model.fit(&array![[0.0], [1.0]], &array![0, 0]).is_err());
    }
}
