//! Baselines that ignore the features.
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::DummyStrategy;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{check_training_input, label_width, not_fitted, one_hot, Classifier};

pub struct DummyClassifier {
    strategy: DummyStrategy,
    seed: u64,
    /// Training class frequencies, indexed by label.
    priors: Option<Vec<f64>>,
}

impl DummyClassifier {
    pub fn new(strategy: DummyStrategy, seed: u64) -> Self {
        DummyClassifier {
            strategy,
            seed,
            priors: None,
        }
    }

    pub fn strategy(&self) -> DummyStrategy {
        self.strategy
    }

    fn priors(&self) -> Result<&[f64]> {
        self.priors
            .as_deref()
            .ok_or_else(|| not_fitted("Dummy classifier"))
    }

    /// Draws for the random strategies. The generator is reseeded on every
    /// call so repeated predictions agree.
    fn sample(&self, priors: &[f64], n: usize) -> Result<Array1<usize>> {
        let weights: Vec<f64> = match self.strategy {
            DummyStrategy::Uniform => priors
                .iter()
                .map(|p| if *p > 0.0 { 1.0 } else { 0.0 })
                .collect(),
            _ => priors.to_vec(),
        };
        let dist = WeightedIndex::new(&weights).map_err(PipelineError::model)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok((0..n).map(|_| dist.sample(&mut rng)).collect())
    }
}

/// Most frequent label; the smallest label wins a tie.
fn majority(priors: &[f64]) -> usize {
    let mut best = 0;
    for (label, p) in priors.iter().enumerate() {
        if *p > priors[best] {
            best = label;
        }
    }
    best
}

impl Classifier for DummyClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        let mut priors = vec![0.0; label_width(y)];
        for label in y {
            priors[*label] += 1.0;
        }
        let n = y.len() as f64;
        priors.iter_mut().for_each(|p| *p /= n);
        self.priors = Some(priors);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let priors = self.priors()?;
        match self.strategy {
            DummyStrategy::MostFrequent | DummyStrategy::Prior => {
                Ok(Array1::from_elem(x.nrows(), majority(priors)))
            }
            DummyStrategy::Stratified | DummyStrategy::Uniform => self.sample(priors, x.nrows()),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let priors = self.priors()?;
        let width = priors.len();
        match self.strategy {
            DummyStrategy::Prior => {
                let row = Array1::from_vec(priors.to_vec());
                Ok(Array2::from_shape_fn((x.nrows(), width), |(_, c)| row[c]))
            }
            DummyStrategy::Uniform => {
                let observed = priors.iter().filter(|p| **p > 0.0).count() as f64;
                Ok(Array2::from_shape_fn((x.nrows(), width), |(_, c)| {
                    if priors[c] > 0.0 {
                        1.0 / observed
                    } else {
                        0.0
                    }
                }))
            }
            DummyStrategy::MostFrequent | DummyStrategy::Stratified => {
                Ok(one_hot(&self.predict(x)?, width))
            }
        }
    }

    fn n_classes(&self) -> usize {
        self.priors.as_ref().map(Vec::len).unwrap_or(0)
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(DummyClassifier::new(self.strategy, self.seed))
    }
}
