//! Training Pipeline
//!
//! Dataset → (LabelEncoder, RandomForest) pair.
//!
//! 1. Reject degenerate data (no rows, a single class)
//! 2. Fit the encoder on the full label column
//! 3. Stratified train/test split on the encoded labels
//! 4. Fit the forest on the training partition
//!
//! `fit_full` skips the split and trains on every row; `cross_validate`
//! runs the k-fold estimate over the whole dataset.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{CropError, Result};
use crate::features::FeatureVector;
use crate::model::artifacts::ModelBundle;
use crate::model::encoder::LabelEncoder;
use crate::model::forest::{ForestParams, RandomForest};
use crate::training::cross_validation::{cross_validate, CrossValidationReport};
use crate::training::split::{stratified_split, TrainTestSplit};

/// Training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Fraction of each class held out for evaluation
    pub test_ratio: f64,

    /// Folds for the cross-validation estimate
    pub k_folds: usize,

    /// Forest hyperparameters
    pub forest: ForestParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            k_folds: 5,
            forest: ForestParams::default(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(CropError::Configuration(format!(
                "test_ratio must be in (0, 1) (got {})",
                self.test_ratio
            )));
        }
        if self.k_folds < 2 {
            return Err(CropError::Configuration(format!(
                "k_folds must be >= 2 (got {})",
                self.k_folds
            )));
        }
        self.forest.validate()
    }
}

/// Encoded view of a dataset
#[derive(Debug, Clone)]
pub struct EncodedData {
    pub encoder: LabelEncoder,
    pub x: Vec<FeatureVector>,
    pub y: Vec<usize>,
}

/// Result of a held-out training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ModelBundle,
    pub split: TrainTestSplit,
    /// Held-out rows, with their original labels
    pub test_set: Dataset,
}

/// Coordinates encoding, splitting and fitting with one seed
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: TrainConfig,
    seed: u64,
}

impl TrainingPipeline {
    pub fn new(config: TrainConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, seed })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Same pipeline with different forest settings
    pub fn with_forest(&self, forest: ForestParams) -> Result<Self> {
        Self::new(TrainConfig { forest, ..self.config.clone() }, self.seed)
    }

    /// Check for degenerate data and encode labels
    pub fn encode(&self, dataset: &Dataset) -> Result<EncodedData> {
        if dataset.is_empty() {
            return Err(CropError::Training("dataset has no rows".to_string()));
        }
        let distinct = dataset.distinct_labels();
        if distinct.len() < 2 {
            let only = distinct.iter().next().copied().unwrap_or_default();
            return Err(CropError::Training(format!(
                "dataset has a single class '{}'; a classifier needs at least two",
                only
            )));
        }

        let encoder = LabelEncoder::fit(dataset.labels())?;
        let y = encoder.encode_all(dataset.labels())?;
        Ok(EncodedData { encoder, x: dataset.features(), y })
    }

    /// Split, then fit on the training partition
    pub fn fit_with_holdout(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        let data = self.encode(dataset)?;
        let split = stratified_split(&data.y, self.config.test_ratio, self.seed)?;

        let x_train: Vec<FeatureVector> = split.train.iter().map(|&r| data.x[r]).collect();
        let y_train: Vec<usize> = split.train.iter().map(|&r| data.y[r]).collect();

        tracing::info!(
            train = split.train.len(),
            test = split.test.len(),
            classes = data.encoder.len(),
            trees = self.config.forest.n_trees,
            "training random forest"
        );
        let forest = RandomForest::fit(&x_train, &y_train, data.encoder.len(), &self.config.forest, self.seed)?;
        let bundle = ModelBundle::new(forest, data.encoder)?;
        let test_set = dataset.subset(&split.test);

        Ok(TrainingOutcome { bundle, split, test_set })
    }

    /// Fit on every row (no held-out partition)
    pub fn fit_full(&self, dataset: &Dataset) -> Result<ModelBundle> {
        let data = self.encode(dataset)?;
        tracing::info!(
            rows = data.x.len(),
            classes = data.encoder.len(),
            trees = self.config.forest.n_trees,
            "training random forest on the full dataset"
        );
        let forest = RandomForest::fit(&data.x, &data.y, data.encoder.len(), &self.config.forest, self.seed)?;
        ModelBundle::new(forest, data.encoder)
    }

    /// Stratified k-fold accuracy over the whole dataset
    pub fn cross_validate(&self, dataset: &Dataset) -> Result<CrossValidationReport> {
        let data = self.encode(dataset)?;
        cross_validate(
            &data.x,
            &data.y,
            data.encoder.len(),
            self.config.k_folds,
            &self.config.forest,
            self.seed,
        )
    }
}
