//! Inference Service
//!
//! - `predictor`: top-k ranking over an immutable (forest, encoder) pair
//! - `service`: process-wide cached predictor with load-once and atomic reload
//! - `metadata`: optional crop display metadata (season, expected yield)

pub mod predictor;
pub mod service;
pub mod metadata;

pub use metadata::{enrich, CropMetadata, CropMetadataStore, EnrichedRecommendation, InMemoryMetadataStore};
pub use predictor::{rank_top_k, CropPredictor, PredictionResult, Recommendation};
pub use service::InferenceService;
