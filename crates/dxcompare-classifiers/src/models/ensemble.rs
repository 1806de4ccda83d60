//! Meta-estimators built from named classifiers.
//!
//! Both ensembles report member failures under the member's name so the
//! evaluator log shows which inner model broke.
use ndarray::{s, Array1, Array2, Axis};

use crate::config::VotingKind;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{
    argmax_rows, check_training_input, label_width, not_fitted, pad_columns, Classifier,
    NamedClassifier,
};

fn require_members(estimators: &[NamedClassifier], kind: &str) -> Result<()> {
    if estimators.is_empty() {
        return Err(PipelineError::InvalidArgument(format!(
            "{} ensemble needs at least one estimator",
            kind
        )));
    }
    Ok(())
}

pub struct VotingClassifier {
    estimators: Vec<NamedClassifier>,
    voting: VotingKind,
    n_classes: usize,
}

impl VotingClassifier {
    pub fn new(estimators: Vec<NamedClassifier>, voting: VotingKind) -> Self {
        VotingClassifier {
            estimators,
            voting,
            n_classes: 0,
        }
    }

    pub fn estimators(&self) -> &[NamedClassifier] {
        &self.estimators
    }

    fn check_fitted(&self) -> Result<()> {
        if self.n_classes == 0 {
            return Err(not_fitted("Voting ensemble"));
        }
        Ok(())
    }

    /// Mean of the member probabilities over a common class width.
    fn mean_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut total = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for member in &self.estimators {
            let proba = member
                .model
                .predict_proba(x)
                .map_err(|e| e.for_classifier(&member.name))?;
            total += &pad_columns(proba, self.n_classes).slice(s![.., ..self.n_classes]);
        }
        Ok(total / self.estimators.len() as f64)
    }

    /// Per-row label counts over the member predictions.
    fn vote_counts(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut counts = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for member in &self.estimators {
            let labels = member
                .model
                .predict(x)
                .map_err(|e| e.for_classifier(&member.name))?;
            for (row, label) in labels.iter().enumerate() {
                if *label < self.n_classes {
                    counts[(row, *label)] += 1.0;
                }
            }
        }
        Ok(counts)
    }
}

impl Classifier for VotingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        require_members(&self.estimators, "voting")?;
        check_training_input(x, y)?;
        for member in self.estimators.iter_mut() {
            member
                .model
                .fit(x, y)
                .map_err(|e| e.for_classifier(&member.name))?;
        }
        self.n_classes = label_width(y);
        Ok(())
    }

    /// Hard voting takes the most common label, soft voting the largest mean
    /// probability; ties go to the smallest label.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        self.check_fitted()?;
        let scores = match self.voting {
            VotingKind::Hard => self.vote_counts(x)?,
            VotingKind::Soft => self.mean_proba(x)?,
        };
        Ok(argmax_rows(&scores))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_fitted()?;
        match self.voting {
            VotingKind::Soft => self.mean_proba(x),
            VotingKind::Hard => {
                let counts = self.vote_counts(x)?;
                Ok(counts / self.estimators.len() as f64)
            }
        }
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(VotingClassifier::new(
            self.estimators.iter().map(NamedClassifier::fresh).collect(),
            self.voting,
        ))
    }
}

/// Stacked generalization: out-of-fold member probabilities are the inputs
/// of a final estimator.
///
/// Folds are stratified: the rows of each class are dealt round-robin over
/// the folds, so every fold keeps roughly the class mix of the training set.
/// After the out-of-fold pass every member is refit on the full training set.
pub struct StackingClassifier {
    estimators: Vec<NamedClassifier>,
    final_estimator: Box<dyn Classifier>,
    cv: usize,
    n_classes: usize,
}

impl StackingClassifier {
    pub fn new(
        estimators: Vec<NamedClassifier>,
        final_estimator: Box<dyn Classifier>,
        cv: usize,
    ) -> Self {
        StackingClassifier {
            estimators,
            final_estimator,
            cv,
            n_classes: 0,
        }
    }

    pub fn estimators(&self) -> &[NamedClassifier] {
        &self.estimators
    }

    /// Concatenated member probabilities, `n_classes` columns per member.
    fn meta_features(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let width = self.n_classes;
        let mut meta = Array2::<f64>::zeros((x.nrows(), width * self.estimators.len()));
        for (m, member) in self.estimators.iter().enumerate() {
            let proba = member
                .model
                .predict_proba(x)
                .map_err(|e| e.for_classifier(&member.name))?;
            meta.slice_mut(s![.., m * width..(m + 1) * width])
                .assign(&pad_columns(proba, width).slice(s![.., ..width]));
        }
        Ok(meta)
    }
}

/// Fold number of every row. Rows are taken class by class in label order
/// and dealt to folds `0, 1, .., k - 1, 0, ..`, so fold sizes differ by at
/// most one and each class is spread as evenly as its count allows.
pub(crate) fn stratified_folds(y: &Array1<usize>, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..y.len()).collect();
    order.sort_by_key(|&i| y[i]);
    let mut folds = vec![0; y.len()];
    for (dealt, &row) in order.iter().enumerate() {
        folds[row] = dealt % k;
    }
    folds
}

impl Classifier for StackingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        require_members(&self.estimators, "stacking")?;
        check_training_input(x, y)?;
        let n = x.nrows();
        let k = self.cv.min(n);
        if k < 2 {
            return Err(PipelineError::InvalidArgument(format!(
                "stacking needs at least two folds, got {} for {} training rows",
                k, n
            )));
        }
        let width = label_width(y);

        let mut meta = Array2::<f64>::zeros((n, width * self.estimators.len()));
        let folds = stratified_folds(y, k);
        for fold in 0..k {
            let (hold_idx, train_idx): (Vec<usize>, Vec<usize>) =
                (0..n).partition(|&i| folds[i] == fold);
            let x_train = x.select(Axis(0), &train_idx);
            let y_train = y.select(Axis(0), &train_idx);
            let x_hold = x.select(Axis(0), &hold_idx);

            for (m, member) in self.estimators.iter().enumerate() {
                let mut model = member.model.fresh();
                model
                    .fit(&x_train, &y_train)
                    .map_err(|e| e.for_classifier(&member.name))?;
                let proba = model
                    .predict_proba(&x_hold)
                    .map_err(|e| e.for_classifier(&member.name))?;
                let proba = pad_columns(proba, width);
                for (&row, p) in hold_idx.iter().zip(proba.rows()) {
                    meta.slice_mut(s![row, m * width..(m + 1) * width])
                        .assign(&p.slice(s![..width]));
                }
            }
        }

        self.final_estimator
            .fit(&meta, y)
            .map_err(|e| e.for_classifier("final estimator"))?;

        for member in self.estimators.iter_mut() {
            member
                .model
                .fit(x, y)
                .map_err(|e| e.for_classifier(&member.name))?;
        }
        self.n_classes = width;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if self.n_classes == 0 {
            return Err(not_fitted("Stacking ensemble"));
        }
        let meta = self.meta_features(x)?;
        self.final_estimator.predict(&meta)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.n_classes == 0 {
            return Err(not_fitted("Stacking ensemble"));
        }
        let meta = self.meta_features(x)?;
        let proba = self.final_estimator.predict_proba(&meta)?;
        Ok(pad_columns(proba, self.n_classes))
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(StackingClassifier::new(
            self.estimators.iter().map(NamedClassifier::fresh).collect(),
            self.final_estimator.fresh(),
            self.cv,
        ))
    }
}
