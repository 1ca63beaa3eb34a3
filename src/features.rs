//! Feature schema
//!
//! The seven agronomic inputs in the fixed column order used by the dataset
//! CSV, the model and the inference service:
//!   N, P, K, temperature, humidity, ph, rainfall

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CropError, Result};

/// Number of numeric features
pub const NUM_FEATURES: usize = 7;

/// Fixed-order feature vector
pub type FeatureVector = [f64; NUM_FEATURES];

/// Column names as they appear in the dataset header
pub const FEATURE_NAMES: [&str; NUM_FEATURES] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Label column name
pub const LABEL_COLUMN: &str = "label";

/// One of the seven numeric inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
}

impl Feature {
    /// All features in column order
    pub const ALL: [Feature; NUM_FEATURES] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
    ];

    /// Column index in a `FeatureVector`
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Feature> {
        Self::ALL.get(idx).copied()
    }

    /// CSV header name
    pub fn column_name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Decimal places used when generating and writing this column
    pub fn precision(self) -> usize {
        match self {
            Feature::Nitrogen | Feature::Phosphorus | Feature::Potassium | Feature::Rainfall => 1,
            Feature::Temperature | Feature::Humidity | Feature::Ph => 2,
        }
    }

    /// Cyclic row offset that decorrelates this column from nitrogen
    pub fn cyclic_offset(self) -> usize {
        match self {
            Feature::Nitrogen => 0,
            Feature::Phosphorus => 37,
            Feature::Potassium => 73,
            Feature::Temperature => 11,
            Feature::Humidity => 59,
            Feature::Ph => 101,
            Feature::Rainfall => 149,
        }
    }

    /// Physical clipping bounds applied after noise injection (None = unclipped)
    pub fn physical_bounds(self) -> Option<(f64, f64)> {
        match self {
            Feature::Humidity => Some((0.0, 100.0)),
            Feature::Ph => Some((3.5, 9.0)),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Named soil/climate reading, as submitted by a caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl SoilSample {
    pub fn to_vector(&self) -> FeatureVector {
        [self.n, self.p, self.k, self.temperature, self.humidity, self.ph, self.rainfall]
    }
}

impl From<FeatureVector> for SoilSample {
    fn from(v: FeatureVector) -> Self {
        SoilSample {
            n: v[0],
            p: v[1],
            k: v[2],
            temperature: v[3],
            humidity: v[4],
            ph: v[5],
            rainfall: v[6],
        }
    }
}

/// Validate a caller-supplied slice into a fixed-order feature vector
///
/// Rejects anything that is not exactly seven finite numbers.
pub fn to_feature_vector(values: &[f64]) -> Result<FeatureVector> {
    if values.len() != NUM_FEATURES {
        return Err(CropError::ShapeMismatch {
            expected: NUM_FEATURES,
            found: format!("{} values", values.len()),
        });
    }

    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(CropError::ShapeMismatch {
            expected: NUM_FEATURES,
            found: format!("non-finite value {} in column '{}'", values[pos], FEATURE_NAMES[pos]),
        });
    }

    let mut out = [0.0; NUM_FEATURES];
    out.copy_from_slice(values);
    Ok(out)
}
