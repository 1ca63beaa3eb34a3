//! Pipeline configuration
//!
//! One JSON document groups every stage's settings plus the single seed that
//! drives all randomized steps (shuffle, noise, split, k-fold, forest). Every
//! field is optional in the file; missing fields take their defaults.
//!
//! ```json
//! {
//!   "seed": 42,
//!   "generator": { "rows_per_crop": 200 },
//!   "augment": { "noise_std": 0.05 },
//!   "train": { "test_ratio": 0.2, "k_folds": 5, "forest": { "n_trees": 300 } },
//!   "artifacts": { "dir": "models" },
//!   "data": { "raw_csv": "data/crop_data.csv", "augmented_csv": "data/crop_data_augmented.csv" }
//! }
//! ```
//!
//! Environment overrides: `CROP_CONFIG` (path of the JSON file),
//! `CROP_MODEL_DIR` (artifact directory), `CROP_SEED` (seed).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::augment::AugmentConfig;
use crate::dataset::generator::GeneratorConfig;
use crate::error::{CropError, Result};
use crate::model::artifacts::ArtifactPaths;
use crate::training::pipeline::TrainConfig;

/// Default seed for every randomized stage
pub const DEFAULT_SEED: u64 = 42;

/// Dataset CSV locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub raw_csv: PathBuf,
    pub augmented_csv: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            raw_csv: PathBuf::from("data/crop_data.csv"),
            augmented_csv: PathBuf::from("data/crop_data_augmented.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub seed: u64,
    pub generator: GeneratorConfig,
    pub augment: AugmentConfig,
    pub train: TrainConfig,
    pub artifacts: ArtifactPaths,
    pub data: DatasetPaths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            generator: GeneratorConfig::default(),
            augment: AugmentConfig::default(),
            train: TrainConfig::default(),
            artifacts: ArtifactPaths::default(),
            data: DatasetPaths::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CropError::Configuration(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// `CROP_CONFIG` file if set (defaults otherwise), then env overrides, then validation
    pub fn resolve() -> Result<Self> {
        let mut config = match std::env::var("CROP_CONFIG") {
            Ok(path) if !path.is_empty() => {
                tracing::info!(path = %path, "loading pipeline config");
                Self::load(Path::new(&path))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CROP_MODEL_DIR` and `CROP_SEED`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("CROP_MODEL_DIR") {
            if !dir.is_empty() {
                self.artifacts.dir = PathBuf::from(dir);
            }
        }
        if let Ok(seed) = std::env::var("CROP_SEED") {
            self.seed = seed.trim().parse().map_err(|_| {
                CropError::Configuration(format!("CROP_SEED must be an unsigned integer (got '{}')", seed))
            })?;
        }
        Ok(())
    }

    /// Reject settings that would fail later stages
    pub fn validate(&self) -> Result<()> {
        if self.generator.rows_per_crop == 0 {
            return Err(CropError::Configuration("rows_per_crop must be > 0".to_string()));
        }
        if let Some(crops) = &self.generator.crops {
            if crops.is_empty() {
                return Err(CropError::Configuration("crop list is empty".to_string()));
            }
            for crop in crops {
                crop.validate()?;
            }
        }
        self.augment.validate()?;
        self.train.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::catalogue::ParamRange;

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.generator.rows_per_crop, 200);
        assert_eq!(cfg.augment.noise_std, 0.05);
        assert_eq!(cfg.train.test_ratio, 0.2);
        assert_eq!(cfg.train.forest.n_trees, 300);
        assert_eq!(cfg.artifacts.dir, PathBuf::from("models"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(
            &path,
            r#"{"seed": 7, "generator": {"rows_per_crop": 50}, "artifacts": {"dir": "out"}}"#,
        )
        .unwrap();

        let cfg = PipelineConfig::load(&path).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.generator.rows_per_crop, 50);
        assert_eq!(cfg.artifacts.dir, PathBuf::from("out"));
        assert_eq!(cfg.artifacts.model_file, "model_rf.json");
        assert_eq!(cfg.train.k_folds, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(matches!(err, CropError::Configuration(_)));
    }

    #[test]
    fn test_validate_catches_bad_ranges() {
        let mut cfg = PipelineConfig::default();
        let mut crops = crate::dataset::catalogue::default_crop_profiles();
        crops[0].temperature = ParamRange::new(30.0, 10.0);
        cfg.generator.crops = Some(crops);
        assert!(matches!(cfg.validate(), Err(CropError::Configuration(_))));

        let mut cfg = PipelineConfig::default();
        cfg.generator.rows_per_crop = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.train.forest.n_trees = 0;
        assert!(cfg.validate().is_err());
    }
}
