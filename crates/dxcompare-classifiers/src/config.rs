use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PipelineError;

/// Prediction rule of the trivial baseline.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DummyStrategy {
    /// Always the most frequent training class.
    MostFrequent,
    /// Most frequent class, with the class priors as probabilities.
    Prior,
    /// Random draws following the training class distribution.
    Stratified,
    /// Random draws, uniform over the training classes.
    Uniform,
}

impl DummyStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DummyStrategy::MostFrequent => "most_frequent",
            DummyStrategy::Prior => "prior",
            DummyStrategy::Stratified => "stratified",
            DummyStrategy::Uniform => "uniform",
        }
    }
}

impl FromStr for DummyStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "most_frequent" => Ok(DummyStrategy::MostFrequent),
            "prior" => Ok(DummyStrategy::Prior),
            "stratified" => Ok(DummyStrategy::Stratified),
            "uniform" => Ok(DummyStrategy::Uniform),
            other => Err(PipelineError::UnsupportedStrategy(other.to_string())),
        }
    }
}

/// How a voting ensemble combines its members.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VotingKind {
    /// Majority of predicted labels.
    Hard,
    /// Largest mean class probability.
    Soft,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    GradientBoosting {
        learning_rate: f32,
        n_estimators: usize,
        max_depth: u32,
        training_optimization_level: u8,
    },
    DecisionTree {
        max_depth: Option<usize>,
    },
    KNeighbors {
        k: usize,
    },
    GaussianNb {
        var_smoothing: f64,
    },
    LogisticRegression {
        max_iterations: u64,
        alpha: f64,
    },
    #[cfg(feature = "svm")]
    LinearSvm {
        c: f64,
    },
    Dummy {
        strategy: DummyStrategy,
        seed: u64,
    },
    Voting {
        voting: VotingKind,
        estimators: Vec<ModelSpec>,
    },
    Stacking {
        estimators: Vec<ModelSpec>,
        final_estimator: Box<ModelType>,
        cv: usize,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::gradient_boosting()
    }
}

impl ModelType {
    pub fn gradient_boosting() -> Self {
        ModelType::GradientBoosting {
            learning_rate: 0.1,
            n_estimators: 100,
            max_depth: 3,
            training_optimization_level: 2,
        }
    }

    pub fn dummy(strategy: DummyStrategy) -> Self {
        ModelType::Dummy { strategy, seed: 42 }
    }

    pub fn gaussian_nb() -> Self {
        ModelType::GaussianNb {
            var_smoothing: 1e-9,
        }
    }

    /// Name used for this model in logs and artifacts when none is given.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::GradientBoosting { .. } => "Gradient Boosting",
            ModelType::DecisionTree { .. } => "Decision Tree",
            ModelType::KNeighbors { .. } => "K Neighbors",
            ModelType::GaussianNb { .. } => "Gaussian Naive Bayes",
            ModelType::LogisticRegression { .. } => "Logistic Regression",
            #[cfg(feature = "svm")]
            ModelType::LinearSvm { .. } => "SVM (Linear Kernel)",
            ModelType::Dummy { .. } => "Dummy",
            ModelType::Voting {
                voting: VotingKind::Soft,
                ..
            } => "Voting (Soft)",
            ModelType::Voting {
                voting: VotingKind::Hard,
                ..
            } => "Voting (Hard)",
            ModelType::Stacking { .. } => "Stacking",
        }
    }
}

impl FromStr for ModelType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gradient_boosting" | "gbdt" => Ok(ModelType::gradient_boosting()),
            "decision_tree" => Ok(ModelType::DecisionTree { max_depth: None }),
            "k_neighbors" | "knn" => Ok(ModelType::KNeighbors { k: 5 }),
            "gaussian_nb" | "naive_bayes" => Ok(ModelType::gaussian_nb()),
            "logistic_regression" => Ok(ModelType::LogisticRegression {
                max_iterations: 100,
                alpha: 1.0,
            }),
            #[cfg(feature = "svm")]
            "svm" | "linear_svm" => Ok(ModelType::LinearSvm { c: 1.0 }),
            "dummy" => Ok(ModelType::dummy(DummyStrategy::MostFrequent)),
            _ => Err(PipelineError::InvalidArgument(format!(
                "Unknown model type: {}. To use svm, please compile with `--features svm`",
                s
            ))),
        }
    }
}

/// A model type together with its display name.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,

    #[serde(flatten)]
    pub model: ModelType,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, model: ModelType) -> Self {
        ModelSpec {
            name: name.into(),
            model,
        }
    }

    /// Spec named after its model type.
    pub fn of(model: ModelType) -> Self {
        ModelSpec::new(model.display_name(), model)
    }
}

/// The single classifiers compared by default.
pub fn default_classifiers() -> Vec<ModelSpec> {
    let mut specs = vec![
        ModelSpec::of(ModelType::gradient_boosting()),
        ModelSpec::of(ModelType::DecisionTree { max_depth: None }),
        ModelSpec::of(ModelType::KNeighbors { k: 5 }),
        ModelSpec::of(ModelType::gaussian_nb()),
        ModelSpec::of(ModelType::LogisticRegression {
            max_iterations: 100,
            alpha: 1.0,
        }),
        ModelSpec::of(ModelType::dummy(DummyStrategy::MostFrequent)),
    ];
    #[cfg(feature = "svm")]
    specs.push(ModelSpec::of(ModelType::LinearSvm { c: 1.0 }));
    specs
}

/// Soft voting over a stratified baseline, naive Bayes and boosting.
pub fn default_voting() -> ModelSpec {
    ModelSpec::of(ModelType::Voting {
        voting: VotingKind::Soft,
        estimators: vec![
            ModelSpec::of(ModelType::dummy(DummyStrategy::Stratified)),
            ModelSpec::of(ModelType::gaussian_nb()),
            ModelSpec::of(ModelType::gradient_boosting()),
        ],
    })
}

/// Stacking of a stratified baseline, a tree and boosting under naive Bayes.
pub fn default_stacking() -> ModelSpec {
    ModelSpec::of(ModelType::Stacking {
        estimators: vec![
            ModelSpec::of(ModelType::dummy(DummyStrategy::Stratified)),
            ModelSpec::of(ModelType::DecisionTree { max_depth: None }),
            ModelSpec::of(ModelType::gradient_boosting()),
        ],
        final_estimator: Box::new(ModelType::gaussian_nb()),
        cv: 5,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_model_names() {
        assert_eq!(
            "KNN".parse::<ModelType>().unwrap(),
            ModelType::KNeighbors { k: 5 }
        );
        assert_eq!(
            "gradient-boosting".parse::<ModelType>().unwrap(),
            ModelType::gradient_boosting()
        );
        assert!("catboost".parse::<ModelType>().is_err());
    }

    #[test]
    fn spec_json_is_flat() {
        let spec = ModelSpec::of(ModelType::KNeighbors { k: 3 });
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["name"], "K Neighbors");
        assert_eq!(json["KNeighbors"]["k"], 3);

        let back: ModelSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn nested_ensembles_round_trip() {
        for spec in [default_voting(), default_stacking()] {
            let text = serde_json::to_string_pretty(&spec).unwrap();
            let back: ModelSpec = serde_json::from_str(&text).unwrap();
            assert_eq!(back, spec);
        }
    }

    #[test]
    fn dummy_strategy_names() {
        assert_eq!(
            "stratified".parse::<DummyStrategy>().unwrap(),
            DummyStrategy::Stratified
        );
        assert!("constant".parse::<DummyStrategy>().is_err());
        let json = serde_json::to_string(&DummyStrategy::MostFrequent).unwrap();
        assert_eq!(json, "\"most_frequent\"");
    }

    #[test]
    fn default_roster_names() {
        let names: Vec<String> = default_classifiers().into_iter().map(|s| s.name).collect();
        assert!(names.contains(&"Gradient Boosting".to_string()));
        assert!(names.contains(&"Dummy".to_string()));
        assert_eq!(default_voting().name, "Voting (Soft)");
        assert_eq!(default_stacking().name, "Stacking");
    }
}
