//! Labeled agronomic dataset
//!
//! - `catalogue`: per-crop parameter ranges and the default label merges
//! - `generator`: deterministic synthetic dataset from crop profiles
//! - `augment`: multiplicative noise injection and label merging
//! - `io`: CSV read/write with Polars

pub mod catalogue;
pub mod generator;
pub mod augment;
pub mod io;

pub use catalogue::{default_crop_profiles, default_label_map, CropProfile, ParamRange};
pub use generator::{DatasetGenerator, GeneratorConfig};
pub use augment::{augment, inject_noise, merge_labels, AugmentConfig, LabelMap};
pub use io::{read_csv, write_csv};

use std::collections::{BTreeMap, BTreeSet};

use crate::features::{Feature, FeatureVector};

/// One labeled observation
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: FeatureVector,
    pub label: String,
}

impl Sample {
    pub fn new(features: FeatureVector, label: impl Into<String>) -> Self {
        Self { features, label: label.into() }
    }

    pub fn value(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }
}

/// Ordered collection of samples
///
/// Row order is significant: every downstream stage consumes rows in the
/// order they are stored here, which is what makes seeded runs repeatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Feature vectors in row order
    pub fn features(&self) -> Vec<FeatureVector> {
        self.samples.iter().map(|s| s.features).collect()
    }

    /// Labels in row order
    pub fn labels(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.label.as_str()).collect()
    }

    /// Values of one column in row order
    pub fn column(&self, feature: Feature) -> Vec<f64> {
        self.samples.iter().map(|s| s.value(feature)).collect()
    }

    /// Distinct labels, sorted
    pub fn distinct_labels(&self) -> BTreeSet<&str> {
        self.samples.iter().map(|s| s.label.as_str()).collect()
    }

    /// Row count per label, sorted by label
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// New dataset with the given rows, in the given order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset::new(indices.iter().map(|&i| self.samples[i].clone()).collect())
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Dataset::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
