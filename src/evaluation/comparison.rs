//! Raw versus augmented comparison
//!
//! Noise and label merging change how separable the classes are. The baseline
//! is scored on the raw generated dataset and the final model on the
//! augmented one, so the accuracy change from augmentation shows up as a
//! number instead of being folded into a single score.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::evaluation::metrics::{evaluate, EvaluationReport};
use crate::training::{TrainingOutcome, TrainingPipeline};

/// Split `dataset`, fit on the training rows and score the held-out rows
pub fn holdout_evaluation(
    pipeline: &TrainingPipeline,
    dataset: &Dataset,
) -> Result<(TrainingOutcome, EvaluationReport)> {
    let outcome = pipeline.fit_with_holdout(dataset)?;
    let report = evaluate(&outcome.bundle, &outcome.test_set)?;
    Ok((outcome, report))
}

/// Held-out reports for the raw and the augmented dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetComparison {
    pub raw: EvaluationReport,
    pub augmented: EvaluationReport,
}

impl DatasetComparison {
    pub fn new(raw: EvaluationReport, augmented: EvaluationReport) -> Self {
        Self { raw, augmented }
    }

    /// Augmented accuracy minus raw accuracy (negative = degradation)
    pub fn accuracy_delta(&self) -> f64 {
        self.augmented.accuracy - self.raw.accuracy
    }

    /// Classes removed by label merging
    pub fn merged_classes(&self) -> usize {
        self.raw
            .confusion
            .labels
            .len()
            .saturating_sub(self.augmented.confusion.labels.len())
    }
}

/// Fit and score the same pipeline on both datasets
pub fn compare_datasets(
    pipeline: &TrainingPipeline,
    raw: &Dataset,
    augmented: &Dataset,
) -> Result<DatasetComparison> {
    let (_, raw_report) = holdout_evaluation(pipeline, raw)?;
    let (_, augmented_report) = holdout_evaluation(pipeline, augmented)?;

    let comparison = DatasetComparison::new(raw_report, augmented_report);
    tracing::info!(
        raw = comparison.raw.accuracy,
        augmented = comparison.augmented.accuracy,
        merged_classes = comparison.merged_classes(),
        "raw versus augmented accuracy"
    );
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{merge_labels, LabelMap, Sample};
    use crate::model::ForestParams;
    use crate::training::TrainConfig;
    use approx::assert_relative_eq;

    /// Three well-separated bands of rainfall, 20 rows each
    fn banded() -> Dataset {
        let mut samples = Vec::new();
        for (band, label) in ["alpha", "beta", "gamma"].iter().enumerate() {
            for i in 0..20 {
                let rainfall = band as f64 * 100.0 + i as f64;
                samples.push(Sample::new([50.0, 40.0, 40.0, 25.0, 60.0, 6.5, rainfall], *label));
            }
        }
        Dataset::new(samples)
    }

    fn pipeline() -> TrainingPipeline {
        let config = TrainConfig {
            forest: ForestParams { n_trees: 10, ..ForestParams::default() },
            ..TrainConfig::default()
        };
        TrainingPipeline::new(config, 42).unwrap()
    }

    #[test]
    fn test_each_report_scores_its_own_dataset() {
        let raw = banded();
        let merged = merge_labels(&raw, &LabelMap::from_pairs([("beta", "alpha")]));

        let comparison = compare_datasets(&pipeline(), &raw, &merged).unwrap();
        assert_eq!(comparison.raw.confusion.labels, vec!["alpha", "beta", "gamma"]);
        assert_eq!(comparison.augmented.confusion.labels, vec!["alpha", "gamma"]);
        assert_eq!(comparison.merged_classes(), 1);

        // Bands are separable on rainfall alone
        assert_relative_eq!(comparison.raw.accuracy, 1.0);
        assert_relative_eq!(comparison.augmented.accuracy, 1.0);
        assert_relative_eq!(comparison.accuracy_delta(), 0.0);
    }

    #[test]
    fn test_holdout_evaluation_uses_the_held_out_rows() {
        let (outcome, report) = holdout_evaluation(&pipeline(), &banded()).unwrap();
        assert_eq!(report.confusion.total(), outcome.test_set.len());
        assert_eq!(outcome.test_set.len(), 12);
    }
}
