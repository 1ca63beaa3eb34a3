//! Crop catalogue
//!
//! Per-crop agronomic envelopes used to synthesize the training dataset, plus
//! the default merge of closely related crops into coarser categories.
//!
//! Column order for every envelope: N, P, K, temperature, humidity, ph, rainfall

use serde::{Deserialize, Serialize};

use crate::dataset::augment::LabelMap;
use crate::error::{CropError, Result};
use crate::features::{Feature, NUM_FEATURES};

/// Closed interval `[min, max]`, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }
}

impl From<(f64, f64)> for ParamRange {
    fn from((min, max): (f64, f64)) -> Self {
        ParamRange { min, max }
    }
}

impl From<ParamRange> for (f64, f64) {
    fn from(r: ParamRange) -> Self {
        (r.min, r.max)
    }
}

/// A named crop with one range per feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    #[serde(rename = "N")]
    pub n: ParamRange,
    #[serde(rename = "P")]
    pub p: ParamRange,
    #[serde(rename = "K")]
    pub k: ParamRange,
    pub temperature: ParamRange,
    pub humidity: ParamRange,
    pub ph: ParamRange,
    pub rainfall: ParamRange,
}

impl CropProfile {
    pub fn new(name: impl Into<String>, ranges: [(f64, f64); NUM_FEATURES]) -> Self {
        let [n, p, k, t, h, ph, r] = ranges;
        Self {
            name: name.into(),
            n: n.into(),
            p: p.into(),
            k: k.into(),
            temperature: t.into(),
            humidity: h.into(),
            ph: ph.into(),
            rainfall: r.into(),
        }
    }

    pub fn range(&self, feature: Feature) -> ParamRange {
        match feature {
            Feature::Nitrogen => self.n,
            Feature::Phosphorus => self.p,
            Feature::Potassium => self.k,
            Feature::Temperature => self.temperature,
            Feature::Humidity => self.humidity,
            Feature::Ph => self.ph,
            Feature::Rainfall => self.rainfall,
        }
    }

    /// Reject empty names, non-finite bounds and inverted intervals
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CropError::Configuration("crop profile with empty name".to_string()));
        }

        for feature in Feature::ALL {
            let range = self.range(feature);
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(CropError::Configuration(format!(
                    "crop '{}': non-finite {} range [{}, {}]",
                    self.name, feature, range.min, range.max
                )));
            }
            if range.min > range.max {
                return Err(CropError::Configuration(format!(
                    "crop '{}': {} min {} > max {}",
                    self.name, feature, range.min, range.max
                )));
            }
        }

        Ok(())
    }
}

// (name, [N, P, K, temperature, humidity, ph, rainfall])
const CROP_TABLE: &[(&str, [(f64, f64); NUM_FEATURES])] = &[
    // Cereals
    ("rice", [(80.0, 120.0), (40.0, 60.0), (40.0, 60.0), (22.0, 28.0), (80.0, 90.0), (6.0, 7.0), (200.0, 300.0)]),
    ("wheat", [(80.0, 120.0), (40.0, 60.0), (30.0, 50.0), (15.0, 25.0), (50.0, 70.0), (6.0, 7.0), (45.0, 80.0)]),
    ("maize", [(80.0, 120.0), (40.0, 60.0), (20.0, 40.0), (20.0, 28.0), (55.0, 70.0), (5.5, 7.0), (60.0, 110.0)]),
    ("barley", [(60.0, 90.0), (20.0, 45.0), (20.0, 45.0), (12.0, 23.0), (40.0, 60.0), (6.0, 7.5), (35.0, 60.0)]),
    ("jowar", [(80.0, 120.0), (40.0, 60.0), (40.0, 60.0), (26.0, 34.0), (40.0, 60.0), (6.0, 7.5), (50.0, 85.0)]),
    ("bajra", [(40.0, 80.0), (30.0, 50.0), (30.0, 50.0), (28.0, 36.0), (30.0, 50.0), (6.5, 8.0), (30.0, 65.0)]),
    ("ragi", [(50.0, 80.0), (20.0, 40.0), (20.0, 40.0), (26.0, 35.0), (40.0, 70.0), (5.0, 7.5), (60.0, 100.0)]),
    // Pulses
    ("chickpea", [(20.0, 40.0), (55.0, 80.0), (75.0, 85.0), (17.0, 22.0), (15.0, 20.0), (6.0, 7.5), (65.0, 90.0)]),
    ("kidneybeans", [(15.0, 35.0), (55.0, 80.0), (15.0, 25.0), (18.0, 27.0), (18.0, 25.0), (5.5, 6.2), (90.0, 150.0)]),
    ("pigeonpeas", [(15.0, 35.0), (55.0, 80.0), (15.0, 25.0), (26.0, 32.0), (35.0, 65.0), (5.0, 7.0), (90.0, 160.0)]),
    ("mothbeans", [(10.0, 35.0), (35.0, 60.0), (15.0, 25.0), (25.0, 32.0), (30.0, 60.0), (5.0, 7.5), (30.0, 70.0)]),
    ("mungbean", [(10.0, 35.0), (35.0, 60.0), (15.0, 25.0), (27.0, 32.0), (60.0, 70.0), (6.2, 7.2), (35.0, 60.0)]),
    ("blackgram", [(30.0, 40.0), (55.0, 80.0), (15.0, 25.0), (25.0, 32.0), (60.0, 70.0), (6.5, 7.5), (60.0, 80.0)]),
    ("lentil", [(10.0, 35.0), (55.0, 80.0), (15.0, 25.0), (18.0, 27.0), (60.0, 70.0), (6.0, 7.5), (35.0, 55.0)]),
    ("soybean", [(20.0, 50.0), (55.0, 80.0), (30.0, 60.0), (20.0, 32.0), (40.0, 70.0), (6.0, 7.5), (60.0, 100.0)]),
    // Fruits
    ("apple", [(20.0, 40.0), (20.0, 40.0), (150.0, 200.0), (15.0, 24.0), (70.0, 90.0), (5.5, 6.5), (100.0, 130.0)]),
    ("banana", [(100.0, 150.0), (60.0, 80.0), (150.0, 250.0), (25.0, 30.0), (80.0, 95.0), (5.5, 7.0), (150.0, 250.0)]),
    ("grapes", [(20.0, 50.0), (30.0, 50.0), (150.0, 200.0), (20.0, 35.0), (50.0, 70.0), (5.5, 7.0), (40.0, 70.0)]),
    ("mango", [(15.0, 40.0), (20.0, 40.0), (25.0, 35.0), (27.0, 35.0), (45.0, 60.0), (4.5, 7.0), (85.0, 110.0)]),
    ("orange", [(40.0, 80.0), (20.0, 40.0), (20.0, 50.0), (15.0, 30.0), (60.0, 80.0), (6.0, 7.5), (80.0, 120.0)]),
    ("papaya", [(50.0, 80.0), (40.0, 60.0), (50.0, 80.0), (25.0, 35.0), (75.0, 90.0), (6.0, 7.0), (150.0, 250.0)]),
    ("pomegranate", [(30.0, 60.0), (20.0, 40.0), (30.0, 60.0), (28.0, 40.0), (30.0, 50.0), (6.0, 7.5), (35.0, 65.0)]),
    ("watermelon", [(80.0, 100.0), (10.0, 30.0), (45.0, 55.0), (25.0, 32.0), (40.0, 55.0), (6.0, 7.0), (40.0, 60.0)]),
    ("muskmelon", [(90.0, 110.0), (10.0, 30.0), (45.0, 55.0), (27.0, 32.0), (40.0, 55.0), (6.0, 7.0), (30.0, 50.0)]),
    ("coconut", [(20.0, 40.0), (10.0, 30.0), (25.0, 35.0), (25.0, 29.0), (70.0, 90.0), (5.0, 6.0), (150.0, 220.0)]),
    ("guava", [(20.0, 40.0), (20.0, 40.0), (20.0, 40.0), (23.0, 30.0), (50.0, 70.0), (6.0, 7.5), (80.0, 140.0)]),
    ("sapota", [(30.0, 50.0), (20.0, 30.0), (30.0, 50.0), (25.0, 35.0), (70.0, 85.0), (6.0, 8.0), (130.0, 180.0)]),
    ("lemon", [(40.0, 80.0), (20.0, 40.0), (20.0, 50.0), (20.0, 30.0), (50.0, 70.0), (5.5, 7.0), (65.0, 95.0)]),
    ("mosambi", [(40.0, 80.0), (20.0, 40.0), (20.0, 50.0), (22.0, 32.0), (50.0, 75.0), (6.0, 7.5), (65.0, 95.0)]),
    ("custard_apple", [(15.0, 35.0), (15.0, 35.0), (15.0, 35.0), (25.0, 35.0), (40.0, 65.0), (6.5, 7.5), (50.0, 85.0)]),
    ("date_palm", [(20.0, 40.0), (10.0, 30.0), (20.0, 40.0), (30.0, 42.0), (20.0, 40.0), (7.0, 8.5), (15.0, 35.0)]),
    ("ber", [(10.0, 30.0), (10.0, 30.0), (10.0, 30.0), (25.0, 40.0), (25.0, 50.0), (7.0, 8.5), (20.0, 50.0)]),
    // Vegetables
    ("tomato", [(50.0, 70.0), (40.0, 60.0), (50.0, 70.0), (20.0, 30.0), (60.0, 80.0), (6.0, 7.0), (60.0, 100.0)]),
    ("potato", [(60.0, 90.0), (40.0, 60.0), (50.0, 80.0), (15.0, 25.0), (50.0, 70.0), (5.0, 6.0), (50.0, 80.0)]),
    ("onion", [(60.0, 90.0), (40.0, 60.0), (50.0, 80.0), (15.0, 30.0), (50.0, 70.0), (6.0, 7.0), (50.0, 80.0)]),
    ("brinjal", [(80.0, 100.0), (60.0, 80.0), (40.0, 60.0), (20.0, 30.0), (60.0, 80.0), (5.5, 6.8), (80.0, 120.0)]),
    ("okra", [(60.0, 80.0), (40.0, 60.0), (30.0, 50.0), (25.0, 35.0), (60.0, 80.0), (6.0, 7.0), (80.0, 120.0)]),
    ("cabbage", [(80.0, 120.0), (60.0, 90.0), (80.0, 120.0), (15.0, 22.0), (60.0, 85.0), (6.0, 7.5), (60.0, 100.0)]),
    ("cauliflower", [(80.0, 120.0), (60.0, 90.0), (80.0, 120.0), (15.0, 25.0), (60.0, 85.0), (6.0, 7.5), (60.0, 100.0)]),
    ("carrot", [(50.0, 80.0), (40.0, 60.0), (80.0, 100.0), (15.0, 22.0), (50.0, 70.0), (6.0, 7.0), (40.0, 80.0)]),
    ("radish", [(50.0, 80.0), (40.0, 60.0), (80.0, 100.0), (12.0, 25.0), (50.0, 70.0), (6.0, 7.0), (40.0, 80.0)]),
    ("spinach", [(20.0, 50.0), (20.0, 40.0), (20.0, 40.0), (12.0, 25.0), (50.0, 70.0), (6.0, 7.5), (50.0, 80.0)]),
    ("bottle_gourd", [(50.0, 70.0), (40.0, 60.0), (40.0, 60.0), (25.0, 35.0), (60.0, 80.0), (6.0, 7.5), (60.0, 100.0)]),
    ("bitter_gourd", [(50.0, 70.0), (40.0, 60.0), (40.0, 60.0), (25.0, 35.0), (60.0, 80.0), (6.0, 7.5), (60.0, 100.0)]),
    ("ridge_gourd", [(50.0, 70.0), (40.0, 60.0), (40.0, 60.0), (25.0, 35.0), (60.0, 80.0), (6.0, 7.5), (60.0, 100.0)]),
    ("cucumber", [(60.0, 80.0), (40.0, 60.0), (50.0, 70.0), (20.0, 30.0), (70.0, 90.0), (5.5, 7.0), (80.0, 120.0)]),
    ("green_chilli", [(60.0, 90.0), (40.0, 60.0), (50.0, 70.0), (20.0, 30.0), (60.0, 80.0), (6.0, 7.0), (60.0, 100.0)]),
    // Commercial / other
    ("cotton", [(110.0, 130.0), (40.0, 60.0), (50.0, 80.0), (22.0, 28.0), (60.0, 80.0), (6.0, 8.0), (60.0, 100.0)]),
    ("jute", [(60.0, 90.0), (35.0, 55.0), (35.0, 45.0), (23.0, 28.0), (75.0, 90.0), (6.0, 7.5), (140.0, 200.0)]),
    ("coffee", [(90.0, 110.0), (20.0, 40.0), (25.0, 35.0), (23.0, 27.0), (50.0, 70.0), (6.0, 7.0), (110.0, 190.0)]),
    ("sugarcane", [(120.0, 150.0), (50.0, 70.0), (60.0, 120.0), (24.0, 32.0), (70.0, 85.0), (6.0, 7.5), (180.0, 240.0)]),
    ("tobacco", [(40.0, 70.0), (35.0, 55.0), (80.0, 120.0), (22.0, 30.0), (55.0, 70.0), (5.5, 7.0), (40.0, 70.0)]),
    ("castor", [(30.0, 50.0), (25.0, 40.0), (25.0, 40.0), (22.0, 30.0), (40.0, 60.0), (5.5, 7.5), (50.0, 70.0)]),
    ("sesame", [(25.0, 45.0), (20.0, 35.0), (20.0, 35.0), (25.0, 33.0), (50.0, 70.0), (5.5, 7.5), (40.0, 70.0)]),
    ("groundnut", [(20.0, 40.0), (40.0, 60.0), (30.0, 50.0), (25.0, 32.0), (45.0, 65.0), (5.5, 7.0), (50.0, 95.0)]),
    ("mustard", [(60.0, 95.0), (40.0, 60.0), (20.0, 35.0), (12.0, 24.0), (40.0, 60.0), (6.0, 7.5), (40.0, 60.0)]),
];

/// Built-in catalogue of 55 crops in their canonical order
pub fn default_crop_profiles() -> Vec<CropProfile> {
    CROP_TABLE
        .iter()
        .map(|(name, ranges)| CropProfile::new(*name, *ranges))
        .collect()
}

/// Default merges: gourds, cole crops and citrus collapse to one category each
pub fn default_label_map() -> LabelMap {
    LabelMap::from_pairs([
        ("bottle_gourd", "gourd"),
        ("bitter_gourd", "gourd"),
        ("ridge_gourd", "gourd"),
        ("cabbage", "cole_crop"),
        ("cauliflower", "cole_crop"),
        ("lemon", "citrus"),
        ("mosambi", "citrus"),
        ("orange", "citrus"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalogue_is_valid() {
        let profiles = default_crop_profiles();
        assert_eq!(profiles.len(), 55);
        for profile in &profiles {
            profile.validate().unwrap();
        }
        let names: HashSet<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), profiles.len(), "crop names must be unique");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut profile = default_crop_profiles().remove(0);
        profile.ph = ParamRange::new(7.5, 6.0);
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, CropError::Configuration(_)));
        assert!(err.to_string().contains("ph"));
    }

    #[test]
    fn test_profile_json_shape() {
        let json = r#"{
            "name": "teff",
            "N": [40, 60], "P": [20, 30], "K": [20, 30],
            "temperature": [10, 27], "humidity": [40, 60],
            "ph": [5.0, 7.0], "rainfall": [45, 100]
        }"#;
        let profile: CropProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.range(Feature::Temperature), ParamRange::new(10.0, 27.0));
        profile.validate().unwrap();
    }

    #[test]
    fn test_default_label_map_targets() {
        let map = default_label_map();
        assert_eq!(map.apply("ridge_gourd"), "gourd");
        assert_eq!(map.apply("orange"), "citrus");
        assert_eq!(map.apply("rice"), "rice");
    }
}
