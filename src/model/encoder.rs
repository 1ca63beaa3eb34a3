//! Label Encoder
//!
//! Explicit bidirectional mapping between category names and contiguous
//! integer codes `0..n`. The mapping itself is the contract: it is persisted
//! next to the forest and checked against it on load.
//!
//! Codes are assigned in alphabetical order of the class names.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};

/// On-disk form: the class list in code order
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncoderArtifact {
    classes: Vec<String>,
}

/// Category name <-> integer code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EncoderArtifact", into = "EncoderArtifact")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl LabelEncoder {
    /// Fit on a label column; codes follow alphabetical order
    pub fn fit<'a, I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = labels.into_iter().collect();
        if distinct.is_empty() {
            return Err(CropError::Training("cannot fit a label encoder on zero labels".to_string()));
        }
        Self::from_classes(distinct.into_iter().map(str::to_string).collect())
    }

    /// Build from an explicit class list (position = code)
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (code, name) in classes.iter().enumerate() {
            if index.insert(name.clone(), code).is_some() {
                return Err(CropError::ArtifactMismatch(format!(
                    "duplicate class '{}' in label encoder",
                    name
                )));
            }
        }
        Ok(Self { classes, index })
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| CropError::UnknownLabel(label.to_string()))
    }

    /// Encode a whole label column
    pub fn encode_all<'a, I>(&self, labels: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels.into_iter().map(|l| self.encode(l)).collect()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Class names in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Stable hash of the ordered class list, recorded in the model artifact
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.classes.len().hash(&mut hasher);
        for name in &self.classes {
            name.hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl PartialEq for LabelEncoder {
    fn eq(&self, other: &Self) -> bool {
        self.classes == other.classes
    }
}

impl TryFrom<EncoderArtifact> for LabelEncoder {
    type Error = CropError;

    fn try_from(artifact: EncoderArtifact) -> Result<Self> {
        Self::from_classes(artifact.classes)
    }
}

impl From<LabelEncoder> for EncoderArtifact {
    fn from(encoder: LabelEncoder) -> Self {
        EncoderArtifact { classes: encoder.classes }
    }
}
