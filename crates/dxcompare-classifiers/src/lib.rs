//! dxcompare-classifiers: side-by-side evaluation of tabular classifiers.
//!
//! This crate loads a clinical CSV table, describes it (summary statistics,
//! correlations, outliers, class distribution), and evaluates a list of named
//! classifiers on one seeded train/test split. Model wrappers sit behind the
//! [`models::Classifier`] trait so baselines, linfa models, gradient boosting
//! and ensembles are compared through the same loop.
//!
//! The linear SVM depends on the `svm` feature, enabled by default.
pub mod columns;
pub mod config;
pub mod data_analyzer;
pub mod data_loader;
pub mod dataset;
pub mod error;
pub mod error_handler;
pub mod evaluator;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod stats;

pub use error::{ErrorKind, PipelineError, Result};
pub use evaluator::{ClassifierEvaluator, EvaluationResult, Metric, SplitConfig};
