//! Held-out evaluation
//!
//! Accuracy, confusion matrix (rows = true class, columns = predicted class,
//! both in encoder code order), per-class precision/recall/F1 with macro and
//! weighted averages, and the forest's feature importances ranked high to low.
//!
//! Precision or recall with a zero denominator is reported as 0.0.

use std::fmt;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::features::{Feature, NUM_FEATURES};
use crate::model::artifacts::ModelBundle;

/// Fraction of exact matches (0.0 for empty input)
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Square count matrix indexed `[true][predicted]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], labels: Vec<String>) -> Self {
        let n = labels.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t][p] += 1;
        }
        Self { labels, counts }
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual][predicted]
    }

    /// Rows whose true class is `class`
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Rows predicted as `class`
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|c| self.counts[c][c]).sum()
    }

    /// Off-diagonal cells as (true, predicted, count), largest first
    pub fn top_confusions(&self, limit: usize) -> Vec<(&str, &str, usize)> {
        let mut cells: Vec<(&str, &str, usize)> = Vec::new();
        for (t, row) in self.counts.iter().enumerate() {
            for (p, &count) in row.iter().enumerate() {
                if t != p && count > 0 {
                    cells.push((self.labels[t].as_str(), self.labels[p].as_str(), count));
                }
            }
        }
        cells.sort_by(|a, b| b.2.cmp(&a.2));
        cells.truncate(limit);
        cells
    }
}

/// Precision/recall/F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Unweighted or support-weighted average over classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    pub importance: f64,
}

/// Per-class metrics for every class that is present in the truth or the predictions
pub fn class_metrics(confusion: &ConfusionMatrix) -> Vec<ClassMetrics> {
    (0..confusion.labels.len())
        .filter_map(|c| {
            let support = confusion.support(c);
            let predicted = confusion.predicted(c);
            if support == 0 && predicted == 0 {
                return None;
            }
            let tp = confusion.get(c, c) as f64;
            let precision = if predicted > 0 { tp / predicted as f64 } else { 0.0 };
            let recall = if support > 0 { tp / support as f64 } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            Some(ClassMetrics {
                label: confusion.labels[c].clone(),
                precision,
                recall,
                f1,
                support,
            })
        })
        .collect()
}

pub fn macro_average(per_class: &[ClassMetrics]) -> AveragedMetrics {
    let n = per_class.len().max(1) as f64;
    AveragedMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n,
        f1: per_class.iter().map(|m| m.f1).sum::<f64>() / n,
    }
}

pub fn weighted_average(per_class: &[ClassMetrics]) -> AveragedMetrics {
    let total: usize = per_class.iter().map(|m| m.support).sum();
    if total == 0 {
        return AveragedMetrics { precision: 0.0, recall: 0.0, f1: 0.0 };
    }
    let w = |m: &ClassMetrics| m.support as f64 / total as f64;
    AveragedMetrics {
        precision: per_class.iter().map(|m| w(m) * m.precision).sum(),
        recall: per_class.iter().map(|m| w(m) * m.recall).sum(),
        f1: per_class.iter().map(|m| w(m) * m.f1).sum(),
    }
}

/// Importances sorted descending (column order breaks ties)
pub fn ranked_importances(importances: &[f64; NUM_FEATURES]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = Feature::ALL
        .iter()
        .map(|&feature| FeatureImportance { feature, importance: importances[feature.index()] })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

/// Everything reported for one held-out partition
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub importances: Vec<FeatureImportance>,
}

/// Score a trained pair on a labeled partition
///
/// Fails with `UnknownLabel` if the partition holds a class the encoder has
/// never seen.
pub fn evaluate(bundle: &ModelBundle, test: &Dataset) -> Result<EvaluationReport> {
    let y_true = bundle.encoder.encode_all(test.labels())?;
    let y_pred = bundle.forest.predict_batch(&test.features());

    let confusion = ConfusionMatrix::from_predictions(&y_true, &y_pred, bundle.encoder.classes().to_vec());
    let per_class = class_metrics(&confusion);
    let report = EvaluationReport {
        accuracy: accuracy(&y_true, &y_pred),
        macro_avg: macro_average(&per_class),
        weighted_avg: weighted_average(&per_class),
        importances: ranked_importances(&bundle.forest.feature_importances()),
        confusion,
        per_class,
    };

    tracing::info!(rows = test.len(), accuracy = report.accuracy, "evaluated held-out partition");
    Ok(report)
}

impl fmt::Display for EvaluationReport {
    /// Tabular classification report
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|m| m.label.len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(f, "{:>w$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support", w = width)?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support,
                w = width
            )?;
        }
        writeln!(f)?;

        let total = self.confusion.total();
        writeln!(f, "{:>w$} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, total, w = width)?;
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, total,
                w = width
            )?;
        }
        Ok(())
    }
}
