use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{
    argmax_rows, check_training_input, distinct_labels, label_width, not_fitted, Classifier,
};
use crate::preprocessing::Scaler;

/// Linear-kernel SVM, one binary machine per training class (one-vs-rest),
/// with Platt-scaled outputs used as class scores.
pub struct LinearSvmClassifier {
    c: f64,
    fitted: Option<Fitted>,
    n_classes: usize,
}

struct Fitted {
    scaler: Scaler,
    machines: Vec<(usize, Svm<f64, Pr>)>,
}

impl LinearSvmClassifier {
    pub fn new(c: f64) -> Self {
        LinearSvmClassifier {
            c,
            fitted: None,
            n_classes: 0,
        }
    }
}

impl Default for LinearSvmClassifier {
    fn default() -> Self {
        LinearSvmClassifier::new(1.0)
    }
}

impl Classifier for LinearSvmClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        let classes = distinct_labels(y);
        if classes.len() < 2 {
            return Err(PipelineError::Model(
                "SVM needs at least two classes in the training data".to_string(),
            ));
        }
        let scaler = Scaler::fit(x)?;
        let records = scaler.transform(x);

        let params: SvmParams<f64, Pr> = Svm::<f64, Pr>::params()
            .pos_neg_weights(self.c, self.c)
            .linear_kernel();

        let mut machines = Vec::with_capacity(classes.len());
        for class in classes {
            let targets = y.mapv(|l| l == class);
            let dataset = Dataset::new(records.clone(), targets);
            let machine = <SvmParams<f64, Pr> as Fit<_, _, _>>::fit(&params, &dataset)
                .map_err(PipelineError::model)?;
            machines.push((class, machine));
        }
        self.fitted = Some(Fitted { scaler, machines });
        self.n_classes = label_width(y);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    /// Normalized one-vs-rest scores.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted("SVM"))?;
        let records = fitted.scaler.transform(x);

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (class, machine) in &fitted.machines {
            let scores: Array1<Pr> = machine.predict(&records);
            for (row, score) in scores.iter().enumerate() {
                proba[(row, *class)] = f64::from(**score);
            }
        }
        for mut row in proba.rows_mut() {
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            }
        }
        Ok(proba)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(LinearSvmClassifier::new(self.c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separates_linearly_separable_classes() {
        let x = array![
            [0.0, 0.0],
            [0.5, 0.2],
            [0.2, 0.6],
            [0.4, 0.4],
            [4.0, 4.0],
            [4.5, 4.2],
            [4.2, 4.6],
            [4.4, 4.4]
        ];
        let y = array![0, 0, 0, 0, 1, 1, 1, 1];
        let mut svm = LinearSvmClassifier::default();
        svm.fit(&x, &y).unwrap();
        assert_eq!(svm.predict(&array![[0.1, 0.1], [4.3, 4.3]]).unwrap(), array![0, 1]);
    }

    #[test]
    fn single_class_is_rejected() {
        let mut svm = LinearSvmClassifier::default();
        assert!(svm.fit(&array![[0.0], [1.0]], &array![1, 1]).is_err());
    }
}
