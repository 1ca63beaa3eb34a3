//! Crop Recommender
//!
//! Synthetic agronomic dataset → augmentation → random forest → top-k crop
//! recommendations with confidence scores.
//!
//! - `dataset/`: crop catalogue, deterministic generator, noise + label merging, CSV I/O
//! - `model/`: label encoder, CART trees, random forest, persisted artifact pair
//! - `training/`: stratified split, training pipeline, k-fold cross-validation
//! - `evaluation/`: accuracy, confusion matrix, classification report, stress battery
//! - `inference/`: cached predictor with load-once and atomic reload
//! - `config`: JSON pipeline settings with environment overrides
//!
//! A single seed (default 42) drives every randomized step, so a full run is
//! reproducible end to end.

pub mod error;
pub mod features;
pub mod utils;
pub mod config;
pub mod dataset;
pub mod model;
pub mod training;
pub mod evaluation;
pub mod inference;

// Re-export commonly used types
pub use config::{DatasetPaths, PipelineConfig, DEFAULT_SEED};
pub use dataset::{Dataset, DatasetGenerator, LabelMap, Sample};
pub use error::{CropError, Result};
pub use features::{Feature, FeatureVector, SoilSample, NUM_FEATURES};
pub use inference::{CropPredictor, InferenceService, PredictionResult, Recommendation};
pub use model::{ArtifactPaths, LabelEncoder, ModelBundle, RandomForest};
pub use training::{CrossValidationReport, TrainingPipeline};
