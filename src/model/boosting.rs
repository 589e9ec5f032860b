//! Gradient-boosted binary classifier
//!
//! Binomial deviance boosting over depth-limited least-squares regression
//! trees. Stage `m` fits a tree to the residuals `y - p`, then replaces each
//! leaf with a single Newton step `sum(y - p) / sum(p * (1 - p))` over the
//! samples it holds. Training is fully deterministic.

use super::ModelError;
use crate::features::FEATURE_COUNT;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Feature row in schema order
pub type Row = [f64; FEATURE_COUNT];

/// Boosting hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Regression tree stored as a flat node arena; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Below this the node is treated as pure
const MIN_IMPURITY: f64 = 1e-12;

impl RegressionTree {
    fn grow(x: &[Row], target: &[f64], params: &BoostingParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let mut indices: Vec<usize> = (0..x.len()).collect();
        tree.build(x, target, &mut indices, 0, params);
        tree
    }

    fn build(
        &mut self,
        x: &[Row],
        target: &[f64],
        indices: &mut [usize],
        depth: usize,
        params: &BoostingParams,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });

        if depth >= params.max_depth || indices.len() < params.min_samples_split {
            return id;
        }
        let Some(best) = best_split(x, target, indices, params.min_samples_leaf) else {
            return id;
        };

        indices.sort_by(|&a, &b| {
            let left_a = x[a][best.feature] <= best.threshold;
            let left_b = x[b][best.feature] <= best.threshold;
            left_b.cmp(&left_a).then(a.cmp(&b))
        });
        let n_left = indices
            .iter()
            .filter(|&&i| x[i][best.feature] <= best.threshold)
            .count();
        let (left_idx, right_idx) = indices.split_at_mut(n_left);

        let left = self.build(x, target, left_idx, depth + 1, params);
        let right = self.build(x, target, right_idx, depth + 1, params);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    /// Index of the leaf a row lands in
    fn leaf_for(&self, row: &Row) -> usize {
        let mut id = 0;
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
        } = self.nodes[id]
        {
            id = if row[feature] <= threshold { left } else { right };
        }
        id
    }

    fn predict(&self, row: &Row) -> f64 {
        match self.nodes[self.leaf_for(row)] {
            Node::Leaf { value } => value,
            Node::Split { .. } => 0.0,
        }
    }

    /// Every child sits after its parent and inside the arena, so routing
    /// always terminates at a leaf
    fn check_structure(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {id} has non-finite value {value}"));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(format!("node {id} splits on unknown feature {feature}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {id} has a NaN threshold"));
                    }
                    for child in [left, right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(format!("node {id} has invalid child {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Overwrite every leaf with its Newton step
    fn set_newton_leaves(&mut self, x: &[Row], y: &[f64], prob: &[f64]) {
        let mut numerator = vec![0.0; self.nodes.len()];
        let mut denominator = vec![0.0; self.nodes.len()];
        for (i, row) in x.iter().enumerate() {
            let leaf = self.leaf_for(row);
            numerator[leaf] += y[i] - prob[i];
            denominator[leaf] += prob[i] * (1.0 - prob[i]);
        }

        for (id, node) in self.nodes.iter_mut().enumerate() {
            if let Node::Leaf { value } = node {
                *value = if denominator[id].abs() < 1e-150 {
                    0.0
                } else {
                    numerator[id] / denominator[id]
                };
            }
        }
    }
}

/// Best variance-reducing split across all features.
///
/// Thresholds sit halfway between adjacent distinct values. Ties in gain
/// keep the earliest feature and lowest threshold.
fn best_split(
    x: &[Row],
    target: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| target[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| target[i] * target[i]).sum();
    if total_sq - total * total / n as f64 <= MIN_IMPURITY {
        return None;
    }

    let min_leaf = min_samples_leaf.max(1);
    let parent_score = total * total / n as f64;
    let mut best: Option<SplitCandidate> = None;
    let mut order: Vec<usize> = indices.to_vec();

    for feature in 0..FEATURE_COUNT {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for pos in 1..n {
            left_sum += target[order[pos - 1]];
            if pos < min_leaf || n - pos < min_leaf {
                continue;
            }
            let lo = x[order[pos - 1]][feature];
            let hi = x[order[pos]][feature];
            if lo.partial_cmp(&hi) != Some(Ordering::Less) {
                continue;
            }

            let right_sum = total - left_sum;
            let score =
                left_sum * left_sum / pos as f64 + right_sum * right_sum / (n - pos) as f64;
            let gain = score - parent_score;
            if gain > MIN_IMPURITY && best.as_ref().map_or(true, |b| gain > b.gain) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

/// Fitted boosted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    params: BoostingParams,
    initial_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingClassifier {
    /// Fit on rows and binary labels (`true` = positive class).
    ///
    /// Both classes must be present; a single-class set reports fold 0.
    pub fn fit(x: &[Row], labels: &[bool], params: BoostingParams) -> Result<Self, ModelError> {
        if x.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                features: x.len(),
                labels: labels.len(),
            });
        }
        if x.is_empty() {
            return Err(ModelError::InsufficientData {
                required: 1,
                available: 0,
            });
        }

        let y: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let n = y.len() as f64;
        let positives: f64 = y.iter().sum();
        if positives == 0.0 || positives == n {
            return Err(ModelError::SingleClass { fold: 0 });
        }

        let base_rate = positives / n;
        let initial_score = (base_rate / (1.0 - base_rate)).ln();
        let mut scores = vec![initial_score; x.len()];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let prob: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
            let residuals: Vec<f64> = y.iter().zip(&prob).map(|(yi, pi)| yi - pi).collect();

            let mut tree = RegressionTree::grow(x, &residuals, &params);
            tree.set_newton_leaves(x, &y, &prob);

            for (score, row) in scores.iter_mut().zip(x) {
                *score += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            initial_score,
            trees,
        })
    }

    /// Raw additive score (log-odds of the positive class)
    pub fn decision_function(&self, row: &Row) -> f64 {
        self.trees.iter().fold(self.initial_score, |acc, tree| {
            acc + self.params.learning_rate * tree.predict(row)
        })
    }

    /// Uncalibrated probability of the positive class
    pub fn predict_proba(&self, row: &Row) -> f64 {
        sigmoid(self.decision_function(row))
    }

    /// Reject deserialised ensembles that would panic or loop when scored
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        if !self.initial_score.is_finite() || !self.params.learning_rate.is_finite() {
            return Err("non-finite initial score or learning rate".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_structure()
                .map_err(|reason| format!("tree {i}: {reason}"))?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }
}
