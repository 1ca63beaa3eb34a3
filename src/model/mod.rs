//! Classifier model
//!
//! - `encoder`: category name <-> integer code
//! - `tree`: CART classification tree (gini)
//! - `forest`: bootstrap-aggregated trees with per-split feature subsetting
//! - `artifacts`: JSON persistence of the matched (forest, encoder) pair

pub mod encoder;
pub mod tree;
pub mod forest;
pub mod artifacts;

pub use artifacts::{ArtifactPaths, ModelBundle};
pub use encoder::LabelEncoder;
pub use forest::{ForestParams, RandomForest};
pub use tree::DecisionTree;
