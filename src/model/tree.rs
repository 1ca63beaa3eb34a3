//! CART Classification Tree
//!
//! Gini-impurity decision tree grown to purity. A node becomes an impure leaf
//! only when every feature is constant over its rows (or a depth/size limit
//! applies). Nodes are stored flat in pre-order; node 0 is the root.
//!
//! **Split search**: at every node the seven features are visited in a random
//! order and the best threshold is searched on each until `max_features`
//! non-constant features have been evaluated. Constant features do not count
//! toward the budget. The best split is taken even when it does not lower
//! impurity (XOR-like nodes), so growth never stalls short of purity.
//!
//! **Traversal**: `x[feature] <= threshold` goes left, everything else right.
//!
//! **Importances**: each split adds its weighted impurity decrease
//! `n·gini(node) − n_l·gini(left) − n_r·gini(right)` to its feature.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::features::{FeatureVector, NUM_FEATURES};

/// Tolerance on a leaf's probability mass when validating loaded trees
const LEAF_MASS_TOLERANCE: f64 = 1e-6;

/// Sparse class distribution of a leaf: (class code, probability)
pub type LeafDistribution = SmallVec<[(usize, f64); 2]>;

/// Growth limits for one tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_features: usize,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: LeafDistribution,
    },
}

/// Fitted classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Best threshold found on one feature
struct Candidate {
    feature: usize,
    threshold: f64,
    /// Σ left_count² / n_left + Σ right_count² / n_right (larger = purer children)
    score: f64,
}

/// Working state while growing one tree
struct Builder<'a, R: Rng> {
    x: &'a [FeatureVector],
    y: &'a [usize],
    n_classes: usize,
    params: TreeParams,
    rng: &'a mut R,
    nodes: Vec<Node>,
    importances: [f64; NUM_FEATURES],
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `indices` (duplicates allowed, as
    /// produced by bootstrap sampling)
    ///
    /// Returns the tree and its unnormalized impurity-decrease importances.
    pub fn fit<R: Rng>(
        x: &[FeatureVector],
        y: &[usize],
        mut indices: Vec<usize>,
        n_classes: usize,
        params: TreeParams,
        rng: &mut R,
    ) -> (DecisionTree, [f64; NUM_FEATURES]) {
        let mut builder = Builder {
            x,
            y,
            n_classes,
            params,
            rng,
            nodes: Vec::new(),
            importances: [0.0; NUM_FEATURES],
        };
        builder.grow(&mut indices, 0);

        (DecisionTree { nodes: builder.nodes }, builder.importances)
    }

    /// Leaf distribution reached by `x`
    pub fn leaf(&self, x: &FeatureVector) -> &LeafDistribution {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split { feature, threshold, left, right } => {
                    id = if x[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Add this tree's class probabilities for `x` into `out`
    pub fn accumulate_proba(&self, x: &FeatureVector, out: &mut [f64]) {
        for &(class, p) in self.leaf(x) {
            out[class] += p;
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Structural check used after deserialization
    pub fn validate(&self, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= NUM_FEATURES || !threshold.is_finite() {
                        return Err(format!("node {} has an invalid split", id));
                    }
                    // Pre-order layout: children always come after their parent
                    if *left <= id || *right <= id || *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {} has out-of-range children", id));
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.iter().any(|&(class, _)| class >= n_classes) {
                        return Err(format!("leaf {} references an unknown class", id));
                    }
                    if distribution.iter().any(|&(_, p)| !(p.is_finite() && p >= 0.0)) {
                        return Err(format!("leaf {} has an invalid probability", id));
                    }
                    let mass: f64 = distribution.iter().map(|&(_, p)| p).sum();
                    if (mass - 1.0).abs() > LEAF_MASS_TOLERANCE {
                        return Err(format!("leaf {} probabilities sum to {}", id, mass));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<R: Rng> Builder<'_, R> {
    /// Grow the subtree for `indices`, returning its node id
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let n = indices.len();
        let counts = self.class_counts(indices);
        let sum_sq: f64 = counts.iter().map(|c| c * c).sum();

        let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || n < self.params.min_samples_split {
            return self.push_leaf(&counts, n);
        }

        let best = match self.best_split(indices, &counts) {
            Some(best) => best,
            None => return self.push_leaf(&counts, n),
        };

        let decrease = best.score - sum_sq / n as f64;
        self.importances[best.feature] += decrease.max(0.0);

        let n_left = partition(indices, |i| self.x[i][best.feature] <= best.threshold);
        let id = self.nodes.len();
        self.nodes.push(Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: 0,
            right: 0,
        });

        let (left_rows, right_rows) = indices.split_at_mut(n_left);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1.0;
        }
        counts
    }

    fn push_leaf(&mut self, counts: &[f64], n: usize) -> usize {
        let total = n as f64;
        let distribution: LeafDistribution = counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0.0)
            .map(|(class, &c)| (class, c / total))
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn best_split(&mut self, indices: &[usize], counts: &[f64]) -> Option<Candidate> {
        if indices.len() < 2 {
            return None;
        }
        let mut order: [usize; NUM_FEATURES] = std::array::from_fn(|i| i);
        order.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        let mut visited = 0;
        let mut column: Vec<(f64, usize)> = Vec::with_capacity(indices.len());

        for feature in order {
            if visited >= self.params.max_features {
                break;
            }

            column.clear();
            column.extend(indices.iter().map(|&i| (self.x[i][feature], self.y[i])));
            column.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let (first, last) = (column[0].0, column[column.len() - 1].0);
            if first == last {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.sweep(feature, &column, counts) {
                if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Scan every boundary between distinct sorted values of one feature
    fn sweep(&self, feature: usize, column: &[(f64, usize)], counts: &[f64]) -> Option<Candidate> {
        let n = column.len();
        let mut left = vec![0.0; self.n_classes];
        let mut right = counts.to_vec();
        let mut left_sq = 0.0;
        let mut right_sq: f64 = counts.iter().map(|c| c * c).sum();

        let mut best: Option<Candidate> = None;
        for i in 0..n - 1 {
            let class = column[i].1;
            left_sq += 2.0 * left[class] + 1.0;
            left[class] += 1.0;
            right_sq -= 2.0 * right[class] - 1.0;
            right[class] -= 1.0;

            let (v, next) = (column[i].0, column[i + 1].0);
            if v >= next {
                continue;
            }

            let n_left = (i + 1) as f64;
            let n_right = (n - i - 1) as f64;
            let score = left_sq / n_left + right_sq / n_right;
            if best.as_ref().map_or(true, |b| score > b.score) {
                let mid = v + (next - v) / 2.0;
                let threshold = if mid < next { mid } else { v };
                best = Some(Candidate { feature, threshold, score });
            }
        }
        best
    }
}

/// In-place partition; returns the number of rows satisfying `goes_left`
fn partition<F: Fn(usize) -> bool>(indices: &mut [usize], goes_left: F) -> usize {
    let mut boundary = 0;
    for j in 0..indices.len() {
        if goes_left(indices[j]) {
            indices.swap(boundary, j);
            boundary += 1;
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(max_features: usize) -> TreeParams {
        TreeParams { max_features, min_samples_split: 2, max_depth: None }
    }

    fn row(n: f64, rainfall: f64) -> FeatureVector {
        [n, 10.0, 10.0, 20.0, 50.0, 6.5, rainfall]
    }

    #[test]
    fn test_single_informative_feature() {
        // Only rainfall separates the classes; every other column is constant.
        let x = vec![row(1.0, 50.0), row(1.0, 60.0), row(1.0, 200.0), row(1.0, 210.0)];
        let y = vec![0, 0, 1, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let (tree, imp) = DecisionTree::fit(&x, &y, (0..4).collect(), 2, params(1), &mut rng);

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        match &tree.nodes()[0] {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 6);
                assert_relative_eq!(*threshold, 130.0);
            }
            Node::Leaf { .. } => panic!("root should split"),
        }
        // n·gini = 4 · 0.5 = 2.0, children pure
        assert_relative_eq!(imp[6], 2.0, epsilon = 1e-12);
        assert_eq!(imp.iter().filter(|&&v| v > 0.0).count(), 1);
    }

    #[test]
    fn test_fully_grown_tree_fits_training_rows() {
        let x: Vec<FeatureVector> = (0..30).map(|i| row(i as f64, (i * 7 % 30) as f64)).collect();
        let y: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (tree, _) = DecisionTree::fit(&x, &y, (0..30).collect(), 3, params(2), &mut rng);

        for (xi, &yi) in x.iter().zip(&y) {
            let leaf = tree.leaf(xi);
            assert_eq!(leaf.len(), 1);
            assert_eq!(leaf[0].0, yi);
            assert_relative_eq!(leaf[0].1, 1.0);
        }
        assert!(tree.validate(3).is_ok());
    }

    #[test]
    fn test_identical_rows_with_different_labels_make_a_mixed_leaf() {
        let x = vec![row(5.0, 5.0); 4];
        let y = vec![0, 1, 1, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (tree, imp) = DecisionTree::fit(&x, &y, (0..4).collect(), 2, params(2), &mut rng);

        assert_eq!(tree.nodes().len(), 1);
        let mut proba = vec![0.0; 2];
        tree.accumulate_proba(&x[0], &mut proba);
        assert_relative_eq!(proba[0], 0.25);
        assert_relative_eq!(proba[1], 0.75);
        assert!(imp.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<FeatureVector> = (0..16).map(|i| row(i as f64, i as f64)).collect();
        let y: Vec<usize> = (0..16).map(|i| i % 4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let limited = TreeParams { max_features: 2, min_samples_split: 2, max_depth: Some(1) };
        let (tree, _) = DecisionTree::fit(&x, &y, (0..16).collect(), 4, limited, &mut rng);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn test_bootstrap_duplicates_are_weighted() {
        let x = vec![row(1.0, 1.0), row(2.0, 2.0)];
        let y = vec![0, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (tree, _) = DecisionTree::fit(&x, &y, vec![0, 0, 0], 2, params(2), &mut rng);
        // Only row 0 was sampled, so the tree is a single pure leaf.
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.leaf(&x[1]).as_slice(), &[(0, 1.0)]);
    }

    #[test]
    fn test_json_round_trip() {
        let x = vec![row(1.0, 50.0), row(1.0, 200.0)];
        let y = vec![0, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let (tree, _) = DecisionTree::fit(&x, &y, vec![0, 1], 2, params(2), &mut rng);

        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains(r#""type":"split""#));
        let back: DecisionTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_validate_rejects_bad_children() {
        let tree = DecisionTree {
            nodes: vec![Node::Split { feature: 0, threshold: 1.0, left: 0, right: 5 }],
        };
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn test_validate_rejects_leaves_without_unit_mass() {
        let empty = DecisionTree { nodes: vec![Node::Leaf { distribution: SmallVec::new() }] };
        assert!(empty.validate(2).is_err());

        let zeros = DecisionTree {
            nodes: vec![Node::Leaf { distribution: SmallVec::from_slice(&[(0, 0.0), (1, 0.0)]) }],
        };
        assert!(zeros.validate(2).is_err());

        let negative = DecisionTree {
            nodes: vec![Node::Leaf { distribution: SmallVec::from_slice(&[(0, 1.5), (1, -0.5)]) }],
        };
        assert!(negative.validate(2).is_err());

        let ok = DecisionTree {
            nodes: vec![Node::Leaf { distribution: SmallVec::from_slice(&[(0, 0.25), (1, 0.75)]) }],
        };
        assert!(ok.validate(2).is_ok());
    }

    #[test]
    fn test_xor_node_still_grows_to_purity() {
        // No single split lowers gini at the root; the tree must split anyway.
        let x = vec![row(0.0, 0.0), row(0.0, 1.0), row(1.0, 0.0), row(1.0, 1.0)];
        let y = vec![0, 1, 1, 0];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (tree, imp) = DecisionTree::fit(&x, &y, (0..4).collect(), 2, params(2), &mut rng);

        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 4);
        for (xi, &yi) in x.iter().zip(&y) {
            assert_eq!(tree.leaf(xi).as_slice(), &[(yi, 1.0)]);
        }
        // Root decrease is zero; each child split removes n·gini = 2 · 0.5
        assert_relative_eq!(imp.iter().sum::<f64>(), 2.0, epsilon = 1e-12);
        assert!(tree.validate(2).is_ok());
    }
}
