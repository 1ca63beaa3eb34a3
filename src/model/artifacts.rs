//! Persisted model + encoder pair
//!
//! Two JSON files in one artifact directory:
//! - `model_rf.json`: the forest, wrapped with the class count and the
//!   fingerprint of the encoder it was trained alongside
//! - `label_encoder.json`: the class list in code order
//!
//! Files are written to a temporary name and renamed into place, so a reader
//! never observes a half-written artifact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};
use crate::model::encoder::LabelEncoder;
use crate::model::forest::RandomForest;

/// Bumped whenever the on-disk layout changes
const FORMAT_VERSION: u32 = 1;

/// Where the artifact pair lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub model_file: String,
    pub encoder_file: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            model_file: "model_rf.json".to_string(),
            encoder_file: "label_encoder.json".to_string(),
        }
    }
}

impl ArtifactPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), ..Self::default() }
    }

    /// Directory from `CROP_MODEL_DIR`, falling back to `models`
    pub fn from_env() -> Self {
        match std::env::var("CROP_MODEL_DIR") {
            Ok(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(&self.encoder_file)
    }
}

/// On-disk wrapper around the forest
#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    n_classes: usize,
    class_fingerprint: u64,
    forest: RandomForest,
}

/// A forest and the encoder it was trained with
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub forest: RandomForest,
    pub encoder: LabelEncoder,
}

impl ModelBundle {
    pub fn new(forest: RandomForest, encoder: LabelEncoder) -> Result<Self> {
        if forest.n_classes() != encoder.len() {
            return Err(CropError::ArtifactMismatch(format!(
                "forest predicts {} classes but encoder knows {}",
                forest.n_classes(),
                encoder.len()
            )));
        }
        Ok(Self { forest, encoder })
    }

    /// Write both artifacts, creating the directory if needed
    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        fs::create_dir_all(&paths.dir)?;

        let artifact = ModelArtifact {
            format_version: FORMAT_VERSION,
            n_classes: self.encoder.len(),
            class_fingerprint: self.encoder.fingerprint(),
            forest: self.forest.clone(),
        };
        write_json_atomic(&paths.encoder_path(), &self.encoder)?;
        write_json_atomic(&paths.model_path(), &artifact)?;

        tracing::info!(
            dir = %paths.dir.display(),
            trees = self.forest.n_trees(),
            classes = self.encoder.len(),
            "saved model artifacts"
        );
        Ok(())
    }

    /// Load and cross-check the pair
    ///
    /// Missing, unreadable or corrupt files are `ArtifactNotFound`; a pair
    /// that was not trained together is `ArtifactMismatch`.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let encoder: LabelEncoder = read_json(&paths.encoder_path())?;
        let artifact: ModelArtifact = read_json(&paths.model_path())?;

        if artifact.format_version != FORMAT_VERSION {
            return Err(CropError::ArtifactMismatch(format!(
                "model artifact format v{} (expected v{})",
                artifact.format_version, FORMAT_VERSION
            )));
        }
        if artifact.n_classes != encoder.len() || artifact.forest.n_classes() != encoder.len() {
            return Err(CropError::ArtifactMismatch(format!(
                "model trained on {} classes, encoder has {}",
                artifact.n_classes,
                encoder.len()
            )));
        }
        if artifact.class_fingerprint != encoder.fingerprint() {
            return Err(CropError::ArtifactMismatch(
                "encoder classes differ from the ones the model was trained with".to_string(),
            ));
        }
        artifact.forest.validate()?;

        tracing::info!(
            dir = %paths.dir.display(),
            trees = artifact.forest.n_trees(),
            classes = encoder.len(),
            "loaded model artifacts"
        );
        Ok(Self { forest: artifact.forest, encoder })
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| CropError::ArtifactNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CropError::ArtifactNotFound {
        path: path.to_path_buf(),
        reason: format!("corrupt artifact: {}", e),
    })
}
