//! Training
//!
//! - `split`: stratified train/test and k-fold partitions
//! - `pipeline`: encode → split → fit, or fit on everything
//! - `cross_validation`: k-fold accuracy mean and standard deviation

pub mod split;
pub mod pipeline;
pub mod cross_validation;

pub use cross_validation::{cross_validate, CrossValidationReport};
pub use pipeline::{EncodedData, TrainConfig, TrainingOutcome, TrainingPipeline};
pub use split::{stratified_k_fold, stratified_split, TrainTestSplit};
