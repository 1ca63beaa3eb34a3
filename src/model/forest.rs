//! Random Forest Classifier
//!
//! Bootstrap-aggregated CART trees with random feature subsetting at every
//! split. Class probabilities are the mean of the per-tree leaf distributions.
//!
//! **Determinism**: one seed per tree is drawn sequentially from a ChaCha8
//! stream seeded with the caller's seed, before the parallel section. Trees
//! are then fitted with Rayon in any order and still come out identical.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};
use crate::features::{FeatureVector, NUM_FEATURES};
use crate::model::tree::{DecisionTree, TreeParams};

/// Ensemble hyperparameters (fixed defaults, no search)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,

    /// Features evaluated per split; `None` = floor(sqrt(7)) = 2
    pub max_features: Option<usize>,

    /// Nodes with fewer rows become leaves
    pub min_samples_split: usize,

    /// `None` grows every tree to purity
    pub max_depth: Option<usize>,

    /// Draw a bootstrap resample per tree
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_features: None,
            min_samples_split: 2,
            max_depth: None,
            bootstrap: true,
        }
    }
}

impl ForestParams {
    /// Baseline settings (200 trees) used for the first held-out evaluation
    pub fn baseline() -> Self {
        Self { n_trees: 200, ..Self::default() }
    }

    pub fn resolved_max_features(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (NUM_FEATURES as f64).sqrt().floor() as usize)
            .clamp(1, NUM_FEATURES)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(CropError::Configuration("n_trees must be > 0".to_string()));
        }
        if let Some(m) = self.max_features {
            if m == 0 || m > NUM_FEATURES {
                return Err(CropError::Configuration(format!(
                    "max_features must be in 1..={} (got {})",
                    NUM_FEATURES, m
                )));
            }
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_features: self.resolved_max_features(),
            min_samples_split: self.min_samples_split.max(2),
            max_depth: self.max_depth,
        }
    }
}

/// Fitted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_classes: usize,
    params: ForestParams,
    feature_importances: [f64; NUM_FEATURES],
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on encoded labels `y` (codes in `0..n_classes`)
    pub fn fit(
        x: &[FeatureVector],
        y: &[usize],
        n_classes: usize,
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self> {
        params.validate()?;
        if x.is_empty() {
            return Err(CropError::Training("cannot fit a forest on zero rows".to_string()));
        }
        if x.len() != y.len() {
            return Err(CropError::Training(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(CropError::Training(format!(
                "label code {} outside 0..{}",
                bad, n_classes
            )));
        }

        let n = x.len();
        let tree_params = params.tree_params();
        let mut master = ChaCha8Rng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..params.n_trees).map(|_| master.gen()).collect();

        let fitted: Vec<(DecisionTree, [f64; NUM_FEATURES])> = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let indices: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, y, indices, n_classes, tree_params, &mut rng)
            })
            .collect();

        let (trees, raw_importances): (Vec<_>, Vec<_>) = fitted.into_iter().unzip();
        let feature_importances = aggregate_importances(&raw_importances);

        tracing::debug!(
            trees = trees.len(),
            rows = n,
            classes = n_classes,
            max_features = tree_params.max_features,
            "fitted random forest"
        );

        Ok(Self {
            n_classes,
            params: params.clone(),
            feature_importances,
            trees,
        })
    }

    /// Mean class probabilities over all trees; sums to 1.0
    pub fn predict_proba(&self, x: &FeatureVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            tree.accumulate_proba(x, &mut proba);
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    /// Most probable class code (lowest code wins ties)
    pub fn predict(&self, x: &FeatureVector) -> usize {
        argmax(&self.predict_proba(x))
    }

    pub fn predict_batch(&self, xs: &[FeatureVector]) -> Vec<usize> {
        xs.par_iter().map(|x| self.predict(x)).collect()
    }

    /// Mean-decrease-in-impurity importances in column order, summing to 1.0
    /// (all zeros if no tree ever split)
    pub fn feature_importances(&self) -> [f64; NUM_FEATURES] {
        self.feature_importances
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Structural check used after deserialization
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() || self.n_classes == 0 {
            return Err(CropError::ArtifactMismatch("model artifact has no trees or classes".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes)
                .map_err(|e| CropError::ArtifactMismatch(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}

/// Per-tree normalize, average over trees that split, renormalize
fn aggregate_importances(per_tree: &[[f64; NUM_FEATURES]]) -> [f64; NUM_FEATURES] {
    let mut total = [0.0; NUM_FEATURES];
    let mut contributing = 0usize;

    for imp in per_tree {
        let sum: f64 = imp.iter().sum();
        if sum > 0.0 {
            for (t, v) in total.iter_mut().zip(imp) {
                *t += v / sum;
            }
            contributing += 1;
        }
    }

    if contributing == 0 {
        return total;
    }
    let sum: f64 = total.iter().sum();
    total.iter_mut().for_each(|t| *t /= sum);
    total
}

/// Index of the largest value; first index wins ties
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Three well-separated clusters along rainfall and nitrogen
    fn clusters() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for class in 0..3 {
            for i in 0..20 {
                let base = class as f64 * 100.0;
                x.push([base + i as f64, 40.0, 40.0, 20.0 + (i % 5) as f64, 60.0, 6.5, base * 2.0 + i as f64]);
                y.push(class);
            }
        }
        (x, y)
    }

    fn small_params() -> ForestParams {
        ForestParams { n_trees: 15, ..ForestParams::default() }
    }

    #[test]
    fn test_fit_and_predict_separable_data() {
        let (x, y) = clusters();
        let forest = RandomForest::fit(&x, &y, 3, &small_params(), 42).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict(&[5.0, 40.0, 40.0, 21.0, 60.0, 6.5, 5.0]), 0);
        assert_eq!(forest.predict(&[210.0, 40.0, 40.0, 21.0, 60.0, 6.5, 410.0]), 2);

        let preds = forest.predict_batch(&x);
        let correct = preds.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert_eq!(correct, x.len());
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = clusters();
        let forest = RandomForest::fit(&x, &y, 3, &small_params(), 1).unwrap();
        let proba = forest.predict_proba(&[150.0, 40.0, 40.0, 22.0, 60.0, 6.5, 250.0]);
        assert_eq!(proba.len(), 3);
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert_relative_eq!(proba.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic_across_thread_schedules() {
        let (x, y) = clusters();
        let a = RandomForest::fit(&x, &y, 3, &small_params(), 9).unwrap();
        let b = RandomForest::fit(&x, &y, 3, &small_params(), 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_importances_sum_to_one_and_ignore_constant_columns() {
        let (x, y) = clusters();
        let forest = RandomForest::fit(&x, &y, 3, &small_params(), 42).unwrap();
        let imp = forest.feature_importances();

        assert_relative_eq!(imp.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        // P, K, humidity and ph are constant in this data
        for idx in [1, 2, 4, 5] {
            assert_eq!(imp[idx], 0.0);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let (x, y) = clusters();
        assert!(matches!(
            RandomForest::fit(&[], &[], 3, &small_params(), 0),
            Err(CropError::Training(_))
        ));
        assert!(matches!(
            RandomForest::fit(&x, &y[..5], 3, &small_params(), 0),
            Err(CropError::Training(_))
        ));
        assert!(matches!(
            RandomForest::fit(&x, &y, 2, &small_params(), 0),
            Err(CropError::Training(_))
        ));
        let zero = ForestParams { n_trees: 0, ..ForestParams::default() };
        assert!(matches!(
            RandomForest::fit(&x, &y, 3, &zero, 0),
            Err(CropError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_max_features() {
        assert_eq!(ForestParams::default().resolved_max_features(), 2);
        assert_eq!(ForestParams::baseline().n_trees, 200);
    }

    #[test]
    fn test_aggregate_importances_skips_stumps() {
        let per_tree = [[0.0; NUM_FEATURES], [2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0]];
        let imp = aggregate_importances(&per_tree);
        assert_relative_eq!(imp[0], 0.5);
        assert_relative_eq!(imp[6], 0.5);
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
