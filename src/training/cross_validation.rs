//! Stratified k-fold accuracy estimate
//!
//! Every fold fits a fresh forest on the other k−1 folds and scores exact
//! label matches on its own rows. Folds run in parallel; each forest uses the
//! pipeline seed so the report is reproducible.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::evaluation::metrics::accuracy;
use crate::features::FeatureVector;
use crate::model::forest::{ForestParams, RandomForest};
use crate::training::split::stratified_k_fold;
use crate::utils::{mean, std_dev};

/// Per-fold accuracies with their mean and (population) standard deviation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationReport {
    pub fold_accuracies: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CrossValidationReport {
    pub fn from_scores(fold_accuracies: Vec<f64>) -> Self {
        let mean = mean(&fold_accuracies);
        let std = std_dev(&fold_accuracies);
        Self { fold_accuracies, mean, std }
    }

    pub fn k(&self) -> usize {
        self.fold_accuracies.len()
    }
}

/// Run stratified k-fold over encoded rows
pub fn cross_validate(
    x: &[FeatureVector],
    y: &[usize],
    n_classes: usize,
    k: usize,
    params: &ForestParams,
    seed: u64,
) -> Result<CrossValidationReport> {
    let folds = stratified_k_fold(y, k, seed)?;

    let scores: Vec<f64> = folds
        .par_iter()
        .enumerate()
        .map(|(i, fold)| -> Result<f64> {
            let x_train: Vec<FeatureVector> = fold.train.iter().map(|&r| x[r]).collect();
            let y_train: Vec<usize> = fold.train.iter().map(|&r| y[r]).collect();
            let x_test: Vec<FeatureVector> = fold.test.iter().map(|&r| x[r]).collect();
            let y_test: Vec<usize> = fold.test.iter().map(|&r| y[r]).collect();

            let forest = RandomForest::fit(&x_train, &y_train, n_classes, params, seed)?;
            let score = accuracy(&y_test, &forest.predict_batch(&x_test));
            tracing::debug!(fold = i + 1, accuracy = score, "cross-validation fold");
            Ok(score)
        })
        .collect::<Result<Vec<f64>>>()?;

    let report = CrossValidationReport::from_scores(scores);
    tracing::info!(k, mean = report.mean, std = report.std, "cross-validation complete");
    Ok(report)
}
