//! Classification metrics over encoded labels.
//!
//! Averaged precision, recall and F1 are support-weighted: each class score is
//! weighted by the number of true samples of that class. A score whose
//! denominator is zero counts as 0.
use std::fmt;

use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::preprocessing::LabelEncoder;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    /// Sorted union of the labels seen in truth and predictions.
    labels: Vec<usize>,
    /// Rows are true labels, columns predicted labels.
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[usize], y_pred: &[usize]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::InvalidArgument(format!(
                "expected {} predictions, got {}",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(PipelineError::InvalidArgument(
                "cannot score an empty prediction set".to_string(),
            ));
        }
        let mut labels: Vec<usize> = y_true.iter().chain(y_pred).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let mut counts = Array2::<usize>::zeros((labels.len(), labels.len()));
        for (t, p) in y_true.iter().zip(y_pred) {
            let row = labels.binary_search(t).unwrap_or_default();
            let col = labels.binary_search(p).unwrap_or_default();
            counts[(row, col)] += 1;
        }
        Ok(ConfusionMatrix { labels, counts })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Number of true samples of the class at position `i`.
    pub fn support(&self, i: usize) -> usize {
        self.counts.row(i).sum()
    }

    pub fn precision(&self, i: usize) -> f64 {
        ratio(self.counts[(i, i)], self.counts.column(i).sum())
    }

    pub fn recall(&self, i: usize) -> f64 {
        ratio(self.counts[(i, i)], self.support(i))
    }

    pub fn f1(&self, i: usize) -> f64 {
        let p = self.precision(i);
        let r = self.recall(i);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = self.counts.diag().sum();
        ratio(correct, self.total())
    }

    pub fn weighted_precision(&self) -> f64 {
        self.weighted(|i| self.precision(i))
    }

    pub fn weighted_recall(&self) -> f64 {
        self.weighted(|i| self.recall(i))
    }

    pub fn weighted_f1(&self) -> f64 {
        self.weighted(|i| self.f1(i))
    }

    fn weighted(&self, score: impl Fn(usize) -> f64) -> f64 {
        let total = self.total() as f64;
        (0..self.labels.len())
            .map(|i| score(i) * self.support(i) as f64)
            .sum::<f64>()
            / total
    }

    fn macro_avg(&self, score: impl Fn(usize) -> f64) -> f64 {
        let n = self.labels.len() as f64;
        (0..self.labels.len()).map(score).sum::<f64>() / n
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    Ok(ConfusionMatrix::new(y_true, y_pred)?.accuracy())
}

/// The four headline metrics of one classifier on one test set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub accuracy: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl From<&ConfusionMatrix> for Scores {
    fn from(cm: &ConfusionMatrix) -> Self {
        Scores {
            accuracy: cm.accuracy(),
            f1: cm.weighted_f1(),
            precision: cm.weighted_precision(),
            recall: cm.weighted_recall(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1/support table with accuracy, macro and
/// weighted averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn new(cm: &ConfusionMatrix, encoder: &LabelEncoder) -> Self {
        let classes = cm
            .labels()
            .iter()
            .enumerate()
            .map(|(i, label)| ClassScores {
                name: encoder.class_name(*label),
                precision: cm.precision(i),
                recall: cm.recall(i),
                f1: cm.f1(i),
                support: cm.support(i),
            })
            .collect();
        let total = cm.total();
        ClassificationReport {
            classes,
            accuracy: cm.accuracy(),
            macro_avg: ClassScores {
                name: "macro avg".to_string(),
                precision: cm.macro_avg(|i| cm.precision(i)),
                recall: cm.macro_avg(|i| cm.recall(i)),
                f1: cm.macro_avg(|i| cm.f1(i)),
                support: total,
            },
            weighted_avg: ClassScores {
                name: "weighted avg".to_string(),
                precision: cm.weighted_precision(),
                recall: cm.weighted_recall(),
                f1: cm.weighted_f1(),
                support: total,
            },
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());
        let row = |f: &mut fmt::Formatter<'_>, s: &ClassScores| {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                s.name,
                s.precision,
                s.recall,
                s.f1,
                s.support,
                width = width
            )
        };

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            width = width
        )?;
        writeln!(f)?;
        for class in &self.classes {
            row(f, class)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.weighted_avg.support,
            width = width
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}
