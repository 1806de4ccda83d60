pub mod bayes;
pub mod dummy;
pub mod ensemble;
pub mod gbdt;
pub mod knn;
pub mod logistic;
#[cfg(feature = "svm")]
pub mod svm;
pub mod tree;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::{Classifier, NamedClassifier};
