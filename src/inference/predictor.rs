//! Top-k crop prediction over a loaded (forest, encoder) pair
//!
//! **Ranking**: per-class probabilities are sorted descending with a stable
//! sort, so equal probabilities keep ascending class-code order. Each selected
//! probability becomes a percentage rounded to two decimals.
//!
//! **k policy**: `k == 0` is rejected with `InvalidK`; `k` above the number of
//! known classes is clamped (with a warning) and flagged on the result.

use serde::Serialize;

use crate::error::{CropError, Result};
use crate::features::{to_feature_vector, SoilSample};
use crate::model::artifacts::{ArtifactPaths, ModelBundle};
use crate::utils::round_to;

/// One ranked crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub crop_name: String,
    /// Probability in percent, in [0, 100]
    pub confidence_percent: f64,
}

/// Ranked recommendations for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub recommendations: Vec<Recommendation>,
    pub requested_k: usize,
    /// `requested_k` exceeded the class count and was reduced
    pub clamped: bool,
}

impl PredictionResult {
    pub fn top(&self) -> Option<&Recommendation> {
        self.recommendations.first()
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Indices and probabilities of the `k` largest entries, descending, stable
pub fn rank_top_k(proba: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = proba.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

/// Immutable predictor; shared behind an `Arc` by the inference service
#[derive(Debug, Clone)]
pub struct CropPredictor {
    bundle: ModelBundle,
}

impl CropPredictor {
    pub fn new(bundle: ModelBundle) -> Self {
        Self { bundle }
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        Ok(Self::new(ModelBundle::load(paths)?))
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn n_classes(&self) -> usize {
        self.bundle.encoder.len()
    }

    /// Crop names the model can return, in code order
    pub fn available_crops(&self) -> &[String] {
        self.bundle.encoder.classes()
    }

    /// One probability per known class, in code order
    pub fn probabilities(&self, features: &[f64]) -> Result<Vec<f64>> {
        let x = to_feature_vector(features)?;
        Ok(self.bundle.forest.predict_proba(&x))
    }

    /// Top-k recommendations for a seven-value vector in column order
    pub fn predict_top_k(&self, features: &[f64], k: usize) -> Result<PredictionResult> {
        let n_classes = self.n_classes();
        if k == 0 {
            return Err(CropError::InvalidK { requested: k, available: n_classes });
        }
        let proba = self.probabilities(features)?;

        let clamped = k > n_classes;
        if clamped {
            tracing::warn!(requested = k, available = n_classes, "k exceeds known classes; clamping");
        }
        let effective_k = k.min(n_classes);

        let recommendations = rank_top_k(&proba, effective_k)
            .into_iter()
            .map(|(code, p)| -> Result<Recommendation> {
                let crop_name = self.bundle.encoder.decode(code).ok_or_else(|| {
                    CropError::ArtifactMismatch(format!("class code {} has no encoder entry", code))
                })?;
                Ok(Recommendation {
                    crop_name: crop_name.to_string(),
                    confidence_percent: round_to(p * 100.0, 2),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PredictionResult { recommendations, requested_k: k, clamped })
    }

    pub fn predict_sample(&self, sample: &SoilSample, k: usize) -> Result<PredictionResult> {
        self.predict_top_k(&sample.to_vector(), k)
    }
}
