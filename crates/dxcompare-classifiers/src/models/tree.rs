use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{check_training_input, label_width, not_fitted, Classifier};

/// CART decision tree with Gini impurity.
pub struct DecisionTreeClassifier {
    max_depth: Option<usize>,
    model: Option<DecisionTree<f64, usize>>,
    n_classes: usize,
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: Option<usize>) -> Self {
        DecisionTreeClassifier {
            max_depth,
            model: None,
            n_classes: 0,
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        let dataset = Dataset::new(x.clone(), y.clone());
        let model = DecisionTree::params()
            .max_depth(self.max_depth)
            .fit(&dataset)
            .map_err(PipelineError::model)?;
        self.model = Some(model);
        self.n_classes = label_width(y);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self.model.as_ref().ok_or_else(|| not_fitted("Decision tree"))?;
        Ok(model.predict(x))
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(DecisionTreeClassifier::new(self.max_depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fits_a_threshold() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0, 0, 0, 1, 1, 1];
        let mut tree = DecisionTreeClassifier::new(None);
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&array![[0.0], [20.0]]).unwrap(), array![0, 1]);
        assert_eq!(tree.predict_proba(&array![[20.0]]).unwrap(), array![[0.0, 1.0]]);
    }

    #[test]
    fn unfitted_predict_errors() {
        assert!(DecisionTreeClassifier::new(Some(2))
            .predict(&array![[1.0]])
            .is_err());
    }
}
