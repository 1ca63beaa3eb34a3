//! Synthetic Dataset Generator
//!
//! Builds a labeled dataset from crop envelopes, deterministically:
//!
//! 1. For each crop and each feature, `rows_per_crop` evenly spaced values
//!    over `[min, max]`, rounded to the column precision and re-clipped so
//!    rounding never leaves the envelope.
//! 2. Row `i` pairs nitrogen value `i` with value `(i + offset) % rows` of
//!    every other column. The per-column offsets (P 37, K 73, temperature 11,
//!    humidity 59, ph 101, rainfall 149) keep the columns from moving in
//!    lockstep, so no single feature separates the crops on its own.
//! 3. All crops are concatenated and shuffled once with the seed.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::dataset::catalogue::{default_crop_profiles, CropProfile};
use crate::dataset::{Dataset, Sample};
use crate::error::{CropError, Result};
use crate::features::{Feature, NUM_FEATURES};
use crate::utils::{clip, linspace, round_to};

/// Generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Rows produced for every crop
    pub rows_per_crop: usize,

    /// Crop envelopes; `None` uses the built-in catalogue
    pub crops: Option<Vec<CropProfile>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows_per_crop: 200,
            crops: None,
        }
    }
}

impl GeneratorConfig {
    /// Configured profiles, or the built-in catalogue
    pub fn profiles(&self) -> Vec<CropProfile> {
        self.crops.clone().unwrap_or_else(default_crop_profiles)
    }
}

/// Validated, immutable generator
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    profiles: Vec<CropProfile>,
    rows_per_crop: usize,
    seed: u64,
}

impl DatasetGenerator {
    /// Validate the configuration up front; nothing is generated on error
    pub fn new(profiles: Vec<CropProfile>, rows_per_crop: usize, seed: u64) -> Result<Self> {
        if profiles.is_empty() {
            return Err(CropError::Configuration("no crop profiles configured".to_string()));
        }
        if rows_per_crop == 0 {
            return Err(CropError::Configuration("rows_per_crop must be > 0".to_string()));
        }

        let mut seen = FxHashSet::default();
        for profile in &profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(CropError::Configuration(format!(
                    "duplicate crop profile '{}'",
                    profile.name
                )));
            }
        }

        Ok(Self { profiles, rows_per_crop, seed })
    }

    pub fn from_config(config: &GeneratorConfig, seed: u64) -> Result<Self> {
        Self::new(config.profiles(), config.rows_per_crop, seed)
    }

    pub fn profiles(&self) -> &[CropProfile] {
        &self.profiles
    }

    pub fn rows_per_crop(&self) -> usize {
        self.rows_per_crop
    }

    /// Generate all crops, then shuffle once
    pub fn generate(&self) -> Dataset {
        let mut samples = Vec::with_capacity(self.profiles.len() * self.rows_per_crop);
        for profile in &self.profiles {
            samples.extend(crop_samples(profile, self.rows_per_crop));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        samples.shuffle(&mut rng);

        tracing::info!(
            crops = self.profiles.len(),
            rows_per_crop = self.rows_per_crop,
            rows = samples.len(),
            "generated synthetic dataset"
        );

        Dataset::new(samples)
    }
}

/// Evenly spaced, rounded, clipped column for one crop and one feature
fn column_values(profile: &CropProfile, feature: Feature, rows: usize) -> Vec<f64> {
    let range = profile.range(feature);
    let decimals = feature.precision();
    linspace(range.min, range.max, rows)
        .into_iter()
        .map(|v| clip(round_to(v, decimals), range.min, range.max))
        .collect()
}

/// All rows for one crop, in generation order (before the global shuffle)
fn crop_samples(profile: &CropProfile, rows: usize) -> Vec<Sample> {
    let columns: Vec<Vec<f64>> = Feature::ALL
        .iter()
        .map(|&feature| column_values(profile, feature, rows))
        .collect();

    (0..rows)
        .map(|i| {
            let mut features = [0.0; NUM_FEATURES];
            for feature in Feature::ALL {
                let row = (i + feature.cyclic_offset()) % rows;
                features[feature.index()] = columns[feature.index()][row];
            }
            Sample::new(features, profile.name.clone())
        })
        .collect()
}
