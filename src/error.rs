//! Error types for the crop recommendation pipeline
//!
//! One enum covers every stage. Configuration and training failures are
//! fatal to the run that raised them; shape and `k` errors are local to a
//! single prediction request and never touch cached model state.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for dataset generation, training and inference
#[derive(Error, Debug)]
pub enum CropError {
    /// Invalid parameter ranges or pipeline settings, caught before work starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model or encoder artifact missing or unreadable
    #[error("Artifact not found at '{path}': {reason}")]
    ArtifactNotFound { path: PathBuf, reason: String },

    /// Model and encoder artifacts were not produced by the same training run
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// Feature vector is not seven finite values in the fixed column order
    #[error("Feature shape mismatch: expected {expected} finite values, got {found}")]
    ShapeMismatch { expected: usize, found: String },

    /// Top-k request that cannot be served
    #[error("Invalid k={requested} (model knows {available} classes)")]
    InvalidK { requested: usize, available: usize },

    /// Degenerate training input (empty dataset, single class, ...)
    #[error("Training error: {0}")]
    Training(String),

    /// Label not known to the encoder
    #[error("Unknown label: '{0}'")]
    UnknownLabel(String),

    /// Dataset content that cannot be used (null cells, missing labels)
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    /// Dataset CSV read/write error
    #[error("Dataset error: {0}")]
    Dataset(#[from] polars::prelude::PolarsError),

    /// Artifact or config (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for the crate
pub type Result<T> = std::result::Result<T, CropError>;

impl CropError {
    /// Per-request errors leave the service usable; everything else is fatal
    /// to the operation that produced it.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            CropError::ShapeMismatch { .. } | CropError::InvalidK { .. }
        )
    }
}
