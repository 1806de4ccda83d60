use crate::config::{ModelSpec, ModelType};
use crate::models::bayes::GaussianNbClassifier;
use crate::models::classifier_trait::{Classifier, NamedClassifier};
use crate::models::dummy::DummyClassifier;
use crate::models::ensemble::{StackingClassifier, VotingClassifier};
use crate::models::gbdt::GradientBoostingClassifier;
use crate::models::knn::KNeighborsClassifier;
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::tree::DecisionTreeClassifier;

/// Build a boxed, unfitted classifier from a `ModelType`.
pub fn build_model(model_type: &ModelType) -> Box<dyn Classifier> {
    match model_type {
        ModelType::GradientBoosting {
            learning_rate,
            n_estimators,
            max_depth,
            training_optimization_level,
        } => Box::new(GradientBoostingClassifier::new(
            *learning_rate,
            *n_estimators,
            *max_depth,
            *training_optimization_level,
        )),
        ModelType::DecisionTree { max_depth } => Box::new(DecisionTreeClassifier::new(*max_depth)),
        ModelType::KNeighbors { k } => Box::new(KNeighborsClassifier::new(*k)),
        ModelType::GaussianNb { var_smoothing } => {
            Box::new(GaussianNbClassifier::new(*var_smoothing))
        }
        ModelType::LogisticRegression {
            max_iterations,
            alpha,
        } => Box::new(LogisticRegressionClassifier::new(*max_iterations, *alpha)),
        #[cfg(feature = "svm")]
        ModelType::LinearSvm { c } => Box::new(crate::models::svm::LinearSvmClassifier::new(*c)),
        ModelType::Dummy { strategy, seed } => Box::new(DummyClassifier::new(*strategy, *seed)),
        ModelType::Voting { voting, estimators } => Box::new(VotingClassifier::new(
            estimators.iter().map(build_named).collect(),
            *voting,
        )),
        ModelType::Stacking {
            estimators,
            final_estimator,
            cv,
        } => Box::new(StackingClassifier::new(
            estimators.iter().map(build_named).collect(),
            build_model(final_estimator),
            *cv,
        )),
    }
}

/// Build a named classifier from its specification.
pub fn build_named(spec: &ModelSpec) -> NamedClassifier {
    NamedClassifier::boxed(spec.name.clone(), build_model(&spec.model))
}

pub fn build_all(specs: &[ModelSpec]) -> Vec<NamedClassifier> {
    specs.iter().map(build_named).collect()
}
