//! Evaluation Harness
//!
//! - `metrics`: accuracy, confusion matrix, classification report, ranked importances
//! - `stress`: fixed battery of regime readings, one predicted label each
//! - `comparison`: the same training run on raw and augmented data

pub mod metrics;
pub mod stress;
pub mod comparison;

pub use metrics::{accuracy, evaluate, ConfusionMatrix, EvaluationReport, FeatureImportance};
pub use stress::{run_stress_tests, StressCase, StressOutcome, STRESS_CASES};
pub use comparison::{compare_datasets, holdout_evaluation, DatasetComparison};
