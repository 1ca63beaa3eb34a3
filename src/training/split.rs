//! Stratified partitioning
//!
//! Both helpers work on encoded labels and return row indices, so the same
//! partition can be applied to feature rows, label codes or a `Dataset`.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{CropError, Result};

/// Row indices of one train/test partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Row indices grouped by class code, in ascending class order
fn rows_by_class(labels: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &class) in labels.iter().enumerate() {
        groups.entry(class).or_default().push(row);
    }
    groups
}

/// Per-class train/test split preserving class proportions
///
/// Each class contributes `round(test_ratio × n_class)` rows to the test
/// partition, capped at `n_class − 1` so every class keeps at least one
/// training row. A singleton class therefore stays entirely in training.
/// Both partitions are shuffled.
pub fn stratified_split(labels: &[usize], test_ratio: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(CropError::Configuration(format!(
            "test_ratio must be in (0, 1) (got {})",
            test_ratio
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (_, mut rows) in rows_by_class(labels) {
        rows.shuffle(&mut rng);
        let n = rows.len();
        let n_test = ((test_ratio * n as f64).round() as usize).min(n.saturating_sub(1));
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(TrainTestSplit { train, test })
}

/// Stratified k-fold partitions
///
/// Each class's shuffled rows are dealt round-robin over the folds, with the
/// dealing position carried across classes so fold sizes differ by at most
/// one. Fold `i` tests on its own rows and trains on all others.
pub fn stratified_k_fold(labels: &[usize], k: usize, seed: u64) -> Result<Vec<TrainTestSplit>> {
    if k < 2 {
        return Err(CropError::Configuration(format!("k_folds must be >= 2 (got {})", k)));
    }
    if labels.len() < k {
        return Err(CropError::Configuration(format!(
            "cannot split {} rows into {} folds",
            labels.len(),
            k
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut fold_of = vec![0usize; labels.len()];
    let mut next_fold = 0;

    for (class, mut rows) in rows_by_class(labels) {
        if rows.len() < k {
            tracing::warn!(class, members = rows.len(), k, "class has fewer members than folds");
        }
        rows.shuffle(&mut rng);
        for row in rows {
            fold_of[row] = next_fold;
            next_fold = (next_fold + 1) % k;
        }
    }

    Ok((0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&row| fold_of[row] == fold);
            TrainTestSplit { train, test }
        })
        .collect())
}
