use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2, Axis};

use crate::error::Result;
use crate::models::classifier_trait::{
    check_training_input, distinct_labels, label_width, not_fitted, Classifier,
};

/// Gradient boosted decision trees, one binary log-likelihood booster per
/// class (one-vs-rest).
pub struct GradientBoostingClassifier {
    learning_rate: f32,
    n_estimators: usize,
    max_depth: u32,
    training_optimization_level: u8,
    state: Option<Fitted>,
}

enum Fitted {
    /// Only one class was present in training.
    Constant { label: usize, n_classes: usize },
    /// One booster per class present in training.
    OneVsRest {
        boosters: Vec<(usize, GBDT)>,
        n_classes: usize,
    },
}

impl GradientBoostingClassifier {
    pub fn new(
        learning_rate: f32,
        n_estimators: usize,
        max_depth: u32,
        training_optimization_level: u8,
    ) -> Self {
        GradientBoostingClassifier {
            learning_rate,
            n_estimators,
            max_depth,
            training_optimization_level,
            state: None,
        }
    }

    fn config(&self, feature_size: usize) -> Config {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.learning_rate);
        config.set_max_depth(self.max_depth);
        config.set_iterations(self.n_estimators);
        config.set_debug(false);
        config.set_training_optimization_level(self.training_optimization_level);
        config.set_loss("LogLikelyhood");
        config
    }
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        GradientBoostingClassifier::new(0.1, 100, 3, 2)
    }
}

fn to_data_vec(x: &Array2<f64>, labels: impl Iterator<Item = f32>) -> DataVec {
    x.axis_iter(Axis(0))
        .zip(labels)
        .map(|(row, label)| {
            let features = row.iter().map(|v| *v as f32).collect();
            Data::new_training_data(features, 1.0, label, None)
        })
        .collect()
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        let n_classes = label_width(y);
        let present = distinct_labels(y);

        if present.len() == 1 {
            self.state = Some(Fitted::Constant {
                label: present[0],
                n_classes,
            });
            return Ok(());
        }

        let config = self.config(x.ncols());
        let mut boosters = Vec::with_capacity(present.len());
        for class in present {
            // labels for the log-likelihood loss are +1 / -1
            let mut train = to_data_vec(
                x,
                y.iter().map(|l| if *l == class { 1.0 } else { -1.0 }),
            );
            let mut booster = GBDT::new(&config);
            booster.fit(&mut train);
            boosters.push((class, booster));
        }
        log::debug!(
            "fitted {} one-vs-rest boosters with {} trees each",
            boosters.len(),
            self.n_estimators
        );
        self.state = Some(Fitted::OneVsRest {
            boosters,
            n_classes,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(crate::models::classifier_trait::argmax_rows(&proba))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| not_fitted("Gradient boosting"))?;
        match state {
            Fitted::Constant { label, n_classes } => {
                let mut proba = Array2::<f64>::zeros((x.nrows(), *n_classes));
                proba.column_mut(*label).fill(1.0);
                Ok(proba)
            }
            Fitted::OneVsRest {
                boosters,
                n_classes,
            } => {
                let test = to_data_vec(x, std::iter::repeat(0.0));
                let mut proba = Array2::<f64>::zeros((x.nrows(), *n_classes));
                for (class, booster) in boosters {
                    let scores = booster.predict(&test);
                    for (row, score) in scores.iter().enumerate() {
                        proba[(row, *class)] = f64::from(*score).clamp(0.0, 1.0);
                    }
                }
                for mut row in proba.axis_iter_mut(Axis(0)) {
                    let total = row.sum();
                    if total > 0.0 {
                        row /= total;
                    } else {
                        let share = 1.0 / boosters.len() as f64;
                        for (class, _) in boosters {
                            row[*class] = share;
                        }
                    }
                }
                Ok(proba)
            }
        }
    }

    fn n_classes(&self) -> usize {
        match &self.state {
            Some(Fitted::Constant { n_classes, .. }) | Some(Fitted::OneVsRest { n_classes, .. }) => {
                *n_classes
            }
            None => 0,
        }
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(GradientBoostingClassifier::new(
            self.learning_rate,
            self.n_estimators,
            self.max_depth,
            self.training_optimization_level,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separates_three_well_spaced_classes() {
        let x = array![
            [0.0, 0.1],
            [0.2, 0.0],
            [0.1, 0.2],
            [5.0, 5.1],
            [5.2, 5.0],
            [5.1, 5.2],
            [10.0, 10.1],
            [10.2, 10.0],
            [10.1, 10.2]
        ];
        let y = array![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let mut model = GradientBoostingClassifier::new(0.1, 20, 3, 2);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (9, 3));
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn single_class_training_is_constant() {
        let x = array![[1.0], [2.0]];
        let mut model = GradientBoostingClassifier::default();
        model.fit(&x, &array![1, 1]).unwrap();
        assert_eq!(model.n_classes(), 2);
        assert_eq!(model.predict(&array![[7.0]]).unwrap(), array![1]);
    }

    #[test]
    fn unfitted_predict_errors() {
        let model = GradientBoostingClassifier::default();
        assert!(model.predict(&array![[1.0]]).is_err());
    }
}
