//! Augmentation Stage
//!
//! Produces a new dataset from an existing one; the input is never modified,
//! so callers can keep both the raw and the augmented artifacts.
//!
//! **Noise injection**: every (row, column) cell is scaled by `1 + e` with
//! `e ~ Normal(0, noise_std)` drawn independently per cell. Draw order is
//! column-major (all rows of N, then all rows of P, ...). Afterwards
//! humidity is clipped to [0, 100] and pH to [3.5, 9.0]; no other column is
//! clipped.
//!
//! **Label merging**: a many-to-one rename of labels. Labels absent from the
//! map are kept. Original names are not recoverable from the output.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dataset::catalogue::default_label_map;
use crate::dataset::{Dataset, Sample};
use crate::error::{CropError, Result};
use crate::features::Feature;
use crate::utils::clip;

/// Fine-grained crop name → merged category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    mapping: FxHashMap<String, String>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mapping: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.mapping.insert(from.into(), to.into());
    }

    /// Merged name for `label`, or `label` itself when unmapped
    pub fn apply<'a>(&'a self, label: &'a str) -> &'a str {
        self.mapping.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Entries sorted by source name, for stable reporting
    pub fn entries_sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .mapping
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

/// Augmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Standard deviation of the multiplicative noise factor
    pub noise_std: f64,

    /// Merge rules; `None` uses the built-in gourd/cole crop/citrus merges
    pub label_map: Option<LabelMap>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            noise_std: 0.05,
            label_map: None,
        }
    }
}

impl AugmentConfig {
    pub fn label_map(&self) -> LabelMap {
        self.label_map.clone().unwrap_or_else(default_label_map)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(CropError::Configuration(format!(
                "noise_std must be finite and >= 0 (got {})",
                self.noise_std
            )));
        }
        Ok(())
    }
}

/// Per-cell multiplicative Gaussian noise followed by physical clipping
pub fn inject_noise(dataset: &Dataset, noise_std: f64, seed: u64) -> Result<Dataset> {
    let normal = Normal::new(0.0, noise_std).map_err(|e| {
        CropError::Configuration(format!("invalid noise_std {}: {}", noise_std, e))
    })?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut samples: Vec<Sample> = dataset.samples().to_vec();
    for feature in Feature::ALL {
        let col = feature.index();
        for sample in samples.iter_mut() {
            let noise: f64 = normal.sample(&mut rng);
            sample.features[col] *= 1.0 + noise;
        }
    }

    for sample in samples.iter_mut() {
        for feature in Feature::ALL {
            if let Some((lo, hi)) = feature.physical_bounds() {
                let col = feature.index();
                sample.features[col] = clip(sample.features[col], lo, hi);
            }
        }
    }

    Ok(Dataset::new(samples))
}

/// Row-wise, order-preserving label rename
pub fn merge_labels(dataset: &Dataset, map: &LabelMap) -> Dataset {
    dataset
        .iter()
        .map(|s| Sample::new(s.features, map.apply(&s.label)))
        .collect()
}

/// Noise injection, then label merging
pub fn augment(dataset: &Dataset, config: &AugmentConfig, seed: u64) -> Result<Dataset> {
    config.validate()?;
    let label_map = config.label_map();

    let noisy = inject_noise(dataset, config.noise_std, seed)?;
    let merged = merge_labels(&noisy, &label_map);

    tracing::info!(
        rows = merged.len(),
        noise_std = config.noise_std,
        classes_before = dataset.distinct_labels().len(),
        classes_after = merged.distinct_labels().len(),
        "augmented dataset"
    );

    Ok(merged)
}
