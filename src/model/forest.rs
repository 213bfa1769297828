//! Random forest ensemble member
//!
//! Bootstrap-aggregated binary decision trees: Gini splits, sqrt feature
//! subsampling per node, depth cap. All randomness (bagging, feature
//! subsets) flows from one seed so a refit on identical input rebuilds the
//! identical forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn probability_for(&self, features: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { probability } => *probability,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = features.get(*feature).copied().unwrap_or(0.0);
                if value <= *threshold {
                    left.probability_for(features)
                } else {
                    right.probability_for(features)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[f64],
        n_trees: usize,
        max_depth: usize,
        min_samples_split: usize,
        seed: u64,
    ) -> Self {
        let n = features.len();
        let dim = features.first().map(Vec::len).unwrap_or(0);

        let mut trees = Vec::with_capacity(n_trees);
        for tree_index in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_index as u64));
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            trees.push(build_tree(
                features,
                labels,
                &sample,
                0,
                max_depth,
                min_samples_split,
                dim,
                &mut rng,
            ));
        }

        Self { trees }
    }

    /// Fraction of trees' probability mass on the positive class.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.probability_for(features))
            .sum();
        total / self.trees.len() as f64
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.predict_proba(features) >= 0.5 {
            1.0
        } else {
            0.0
        }
    }
}

fn positive_fraction(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.5;
    }
    let positives: f64 = indices.iter().map(|&i| labels[i]).sum();
    positives / indices.len() as f64
}

fn gini(positive_fraction: f64) -> f64 {
    2.0 * positive_fraction * (1.0 - positive_fraction)
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

#[allow(clippy::too_many_arguments)]
fn build_tree(
    features: &[Vec<f64>],
    labels: &[f64],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    min_samples_split: usize,
    dim: usize,
    rng: &mut StdRng,
) -> TreeNode {
    let p = positive_fraction(labels, indices);
    let pure = p == 0.0 || p == 1.0;
    if indices.is_empty()
        || pure
        || depth >= max_depth
        || indices.len() < min_samples_split
        || dim == 0
    {
        return TreeNode::Leaf { probability: p };
    }

    let n_candidates = ((dim as f64).sqrt() as usize).clamp(1, dim);
    let candidates = rand::seq::index::sample(rng, dim, n_candidates);

    let parent_impurity = gini(p);
    let mut best: Option<Split> = None;

    for feature in candidates {
        if let Some(split) = best_split_on(features, labels, indices, feature) {
            let better = match &best {
                Some(current) => split.impurity < current.impurity,
                None => true,
            };
            if better {
                best = Some(split);
            }
        }
    }

    let Some(split) = best else {
        return TreeNode::Leaf { probability: p };
    };
    if split.impurity + 1e-12 >= parent_impurity {
        return TreeNode::Leaf { probability: p };
    }

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| features[i][split.feature] <= split.threshold);

    let left = build_tree(
        features,
        labels,
        &left_indices,
        depth + 1,
        max_depth,
        min_samples_split,
        dim,
        rng,
    );
    let right = build_tree(
        features,
        labels,
        &right_indices,
        depth + 1,
        max_depth,
        min_samples_split,
        dim,
        rng,
    );

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Lowest weighted Gini impurity over all distinct-value midpoints of one
/// feature, or None when every sample shares the same value.
fn best_split_on(
    features: &[Vec<f64>],
    labels: &[f64],
    indices: &[usize],
    feature: usize,
) -> Option<Split> {
    let mut pairs: Vec<(f64, f64)> = indices
        .iter()
        .map(|&i| (features[i][feature], labels[i]))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let n = pairs.len();
    let total_positives: f64 = pairs.iter().map(|(_, label)| label).sum();

    let mut best: Option<Split> = None;
    let mut left_positives = 0.0;

    for k in 1..n {
        left_positives += pairs[k - 1].1;
        if pairs[k].0 <= pairs[k - 1].0 {
            continue;
        }

        let left_n = k as f64;
        let right_n = (n - k) as f64;
        let left_gini = gini(left_positives / left_n);
        let right_gini = gini((total_positives - left_positives) / right_n);
        let impurity = (left_n * left_gini + right_n * right_gini) / n as f64;

        let better = match &best {
            Some(current) => impurity < current.impurity,
            None => true,
        };
        if better {
            best = Some(Split {
                feature,
                threshold: (pairs[k - 1].0 + pairs[k].0) / 2.0,
                impurity,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![0.9, 0.05],
            vec![0.8, 0.1],
            vec![0.95, 0.0],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.05, 0.95],
            vec![0.0, 0.85],
        ];
        let labels = vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        (features, labels)
    }

    #[test]
    fn test_forest_separates_classes() {
        let (features, labels) = separable_data();
        let forest = RandomForest::fit(&features, &labels, 25, 5, 2, 42);
        assert!(forest.predict_proba(&[1.0, 0.0]) > 0.5);
        assert!(forest.predict_proba(&[0.0, 1.0]) < 0.5);
        assert_eq!(forest.predict(&[0.9, 0.0]), 1.0);
        assert_eq!(forest.predict(&[0.0, 0.9]), 0.0);
    }

    #[test]
    fn test_forest_is_deterministic() {
        let (features, labels) = separable_data();
        let a = RandomForest::fit(&features, &labels, 10, 5, 2, 42);
        let b = RandomForest::fit(&features, &labels, 10, 5, 2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_training_yields_constant_tree() {
        let features = vec![vec![0.5, 0.5], vec![0.4, 0.6]];
        let labels = vec![1.0, 1.0];
        let forest = RandomForest::fit(&features, &labels, 5, 5, 2, 7);
        assert_eq!(forest.predict_proba(&[0.0, 0.0]), 1.0);
    }

    #[test]
    fn test_empty_forest_predicts_even_odds() {
        let forest = RandomForest { trees: Vec::new() };
        assert_eq!(forest.predict_proba(&[1.0]), 0.5);
    }

    #[test]
    fn test_best_split_requires_distinct_values() {
        let features = vec![vec![0.3], vec![0.3], vec![0.3]];
        let labels = vec![1.0, 0.0, 1.0];
        assert!(best_split_on(&features, &labels, &[0, 1, 2], 0).is_none());
    }

    #[test]
    fn test_gini_extremes() {
        assert_eq!(gini(0.0), 0.0);
        assert_eq!(gini(1.0), 0.0);
        assert!((gini(0.5) - 0.5).abs() < 1e-9);
    }
}
