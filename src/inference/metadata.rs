//! Crop display metadata
//!
//! An optional collaborator: given a crop name it may return expected yield
//! and season. Recommendations are paired with whatever it knows; ranking and
//! confidences never depend on it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::inference::predictor::{PredictionResult, Recommendation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropMetadata {
    pub expected_yield: Option<String>,
    pub season: Option<String>,
}

impl CropMetadata {
    pub fn new(season: impl Into<String>, expected_yield: impl Into<String>) -> Self {
        Self {
            expected_yield: Some(expected_yield.into()),
            season: Some(season.into()),
        }
    }
}

/// Lookup by crop name
pub trait CropMetadataStore {
    fn lookup(&self, crop: &str) -> Option<CropMetadata>;
}

/// Map-backed store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryMetadataStore {
    entries: FxHashMap<String, CropMetadata>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, crop: impl Into<String>, metadata: CropMetadata) {
        self.entries.insert(crop.into(), metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Season and yield defaults for the catalogue crops and merged categories
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for &(crop, season, expected_yield) in DEFAULT_METADATA {
            store.insert(crop, CropMetadata::new(season, expected_yield));
        }
        store
    }
}

impl CropMetadataStore for InMemoryMetadataStore {
    fn lookup(&self, crop: &str) -> Option<CropMetadata> {
        self.entries.get(&crop.to_lowercase()).cloned()
    }
}

/// (crop, season, expected yield)
const DEFAULT_METADATA: &[(&str, &str, &str)] = &[
    ("rice", "Kharif", "3-6 tons/hectare"),
    ("wheat", "Rabi", "2-4 tons/hectare"),
    ("maize", "Kharif/Rabi", "5-8 tons/hectare"),
    ("barley", "Rabi", "2-3 tons/hectare"),
    ("jowar", "Kharif", "1.5-3 tons/hectare"),
    ("bajra", "Kharif", "1-2 tons/hectare"),
    ("ragi", "Kharif", "1-2 tons/hectare"),
    ("chickpea", "Rabi", "0.8-1.5 tons/hectare"),
    ("kidneybeans", "Kharif", "1-1.5 tons/hectare"),
    ("pigeonpeas", "Kharif", "0.8-1.2 tons/hectare"),
    ("mothbeans", "Kharif", "0.3-0.5 tons/hectare"),
    ("mungbean", "Kharif/Summer", "0.5-1 tons/hectare"),
    ("blackgram", "Kharif", "0.5-1 tons/hectare"),
    ("lentil", "Rabi", "0.8-1.2 tons/hectare"),
    ("soybean", "Kharif", "1.5-2.5 tons/hectare"),
    ("apple", "Year-round", "10-15 tons/hectare"),
    ("banana", "Year-round", "30-50 tons/hectare"),
    ("grapes", "Year-round", "20-25 tons/hectare"),
    ("mango", "Summer", "8-12 tons/hectare"),
    ("papaya", "Year-round", "40-60 tons/hectare"),
    ("pomegranate", "Year-round", "12-18 tons/hectare"),
    ("watermelon", "Summer", "25-35 tons/hectare"),
    ("muskmelon", "Summer", "15-20 tons/hectare"),
    ("coconut", "Year-round", "10000-15000 nuts/hectare"),
    ("guava", "Year-round", "15-25 tons/hectare"),
    ("sapota", "Year-round", "15-20 tons/hectare"),
    ("custard_apple", "Monsoon", "6-10 tons/hectare"),
    ("date_palm", "Summer", "8-10 tons/hectare"),
    ("ber", "Winter", "8-12 tons/hectare"),
    ("tomato", "Year-round", "25-40 tons/hectare"),
    ("potato", "Rabi", "20-30 tons/hectare"),
    ("onion", "Rabi/Kharif", "25-35 tons/hectare"),
    ("brinjal", "Year-round", "30-40 tons/hectare"),
    ("carrot", "Rabi", "25-35 tons/hectare"),
    ("radish", "Rabi", "20-30 tons/hectare"),
    ("spinach", "Rabi", "10-15 tons/hectare"),
    ("cucumber", "Summer", "20-30 tons/hectare"),
    ("cotton", "Kharif", "1.5-2.5 tons/hectare"),
    ("jute", "Kharif", "2-3 tons/hectare"),
    ("sugarcane", "Kharif", "70-100 tons/hectare"),
    ("coffee", "Year-round", "0.5-1 tons/hectare"),
    ("groundnut", "Kharif", "1.5-2 tons/hectare"),
    ("mustard", "Rabi", "1-1.5 tons/hectare"),
    ("sesame", "Kharif", "0.3-0.5 tons/hectare"),
    ("gourd", "Summer", "15-25 tons/hectare"),
    ("cole_crop", "Rabi", "25-35 tons/hectare"),
    ("citrus", "Winter", "15-20 tons/hectare"),
];

/// A recommendation with whatever display metadata is known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub metadata: Option<CropMetadata>,
}

/// Pair each recommendation with metadata, keeping order and confidences
pub fn enrich(result: &PredictionResult, store: &dyn CropMetadataStore) -> Vec<EnrichedRecommendation> {
    result
        .recommendations
        .iter()
        .map(|r| EnrichedRecommendation {
            recommendation: r.clone(),
            metadata: store.lookup(&r.crop_name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> PredictionResult {
        PredictionResult {
            recommendations: vec![
                Recommendation { crop_name: "rice".to_string(), confidence_percent: 61.5 },
                Recommendation { crop_name: "teff".to_string(), confidence_percent: 20.0 },
            ],
            requested_k: 2,
            clamped: false,
        }
    }

    #[test]
    fn test_enrich_keeps_order_and_tolerates_missing() {
        let store = InMemoryMetadataStore::with_defaults();
        let enriched = enrich(&result(), &store);

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].recommendation.crop_name, "rice");
        assert_eq!(enriched[0].metadata.as_ref().and_then(|m| m.season.as_deref()), Some("Kharif"));
        assert_eq!(enriched[1].recommendation.confidence_percent, 20.0);
        assert!(enriched[1].metadata.is_none());
    }

    #[test]
    fn test_empty_store_changes_nothing() {
        let enriched = enrich(&result(), &InMemoryMetadataStore::new());
        let plain: Vec<Recommendation> = enriched.into_iter().map(|e| e.recommendation).collect();
        assert_eq!(plain, result().recommendations);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = InMemoryMetadataStore::with_defaults();
        assert!(store.lookup("Citrus").is_some());
    }

    #[test]
    fn test_enriched_json_is_flat() {
        let store = InMemoryMetadataStore::with_defaults();
        let json = serde_json::to_value(&enrich(&result(), &store)[0]).unwrap();
        assert_eq!(json["crop_name"], "rice");
        assert_eq!(json["metadata"]["expected_yield"], "3-6 tons/hectare");
    }
}
