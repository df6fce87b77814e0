//! Tree ensembles exported as flat node arrays
//!
//! Each tree stores parallel arrays indexed by node id. A node whose left
//! child is `-1` is a leaf. Traversal goes left when
//! `x[feature] <= threshold`.

use super::{check_arity, Classifier, Regressor};
use crate::error::Result;
use leme_common::Error;
use serde::Deserialize;

const LEAF: i64 = -1;

/// What leaf values hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafValues {
    /// Per-class weights; normalised at prediction time
    ClassWeights,
    /// A single regression value
    Prediction,
}

/// One fitted decision tree
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Check node arrays for consistency
    ///
    /// Children must point forward (`child > node`), which rules out cycles
    /// and guarantees traversal terminates.
    fn validate(
        &self,
        n_features: usize,
        value_width: usize,
        leaf_values: LeafValues,
    ) -> leme_common::Result<()> {
        let artifact = "decision tree";
        let n_nodes = self.children_left.len();
        if n_nodes == 0 {
            return Err(Error::invalid_artifact(artifact, "no nodes"));
        }
        if self.children_right.len() != n_nodes
            || self.feature.len() != n_nodes
            || self.threshold.len() != n_nodes
            || self.value.len() != n_nodes
        {
            return Err(Error::invalid_artifact(artifact, "node arrays differ in length"));
        }

        for node in 0..n_nodes {
            if self.value[node].len() != value_width {
                return Err(Error::invalid_artifact(
                    artifact,
                    format!(
                        "node {} has {} values, expected {}",
                        node,
                        self.value[node].len(),
                        value_width
                    ),
                ));
            }

            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == LEAF {
                check_leaf(node, &self.value[node], leaf_values)?;
                continue;
            }

            let in_range = |child: i64| child > node as i64 && (child as usize) < n_nodes;
            if !in_range(left) || !in_range(right) {
                return Err(Error::invalid_artifact(
                    artifact,
                    format!("node {} has invalid children ({}, {})", node, left, right),
                ));
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(Error::invalid_artifact(
                    artifact,
                    format!("node {} splits on feature {}", node, feature),
                ));
            }
        }
        Ok(())
    }

    fn leaf_value(&self, x: &[f64]) -> &[f64] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

/// Leaf weights must be finite, and class weights non-negative with a
/// positive total
fn check_leaf(node: usize, values: &[f64], leaf_values: LeafValues) -> leme_common::Result<()> {
    let artifact = "decision tree";
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_artifact(
            artifact,
            format!("leaf {} has a non-finite value", node),
        ));
    }
    if leaf_values == LeafValues::ClassWeights {
        if values.iter().any(|w| *w < 0.0) {
            return Err(Error::invalid_artifact(
                artifact,
                format!("leaf {} has a negative class weight", node),
            ));
        }
        if values.iter().sum::<f64>() <= 0.0 {
            return Err(Error::invalid_artifact(
                artifact,
                format!("leaf {} has no class weight", node),
            ));
        }
    }
    Ok(())
}

fn validate_forest(
    trees: &[DecisionTree],
    n_features: usize,
    value_width: usize,
    leaf_values: LeafValues,
) -> leme_common::Result<()> {
    if n_features == 0 {
        return Err(Error::invalid_artifact("random_forest", "n_features is zero"));
    }
    if trees.is_empty() {
        return Err(Error::invalid_artifact("random_forest", "no trees"));
    }
    trees
        .iter()
        .try_for_each(|tree| tree.validate(n_features, value_width, leaf_values))
}

/// Random forest classifier: mean of per-tree leaf class distributions
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn new(
        classes: Vec<String>,
        n_features: usize,
        trees: Vec<DecisionTree>,
    ) -> leme_common::Result<Self> {
        if classes.len() < 2 {
            return Err(Error::invalid_artifact("random_forest", "need at least two classes"));
        }
        validate_forest(&trees, n_features, classes.len(), LeafValues::ClassWeights)?;
        Ok(Self {
            classes,
            n_features,
            trees,
        })
    }
}

impl Classifier for RandomForestClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_arity("classifier", self.n_features, x)?;

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            // Leaf totals are positive, checked at load
            let leaf = tree.leaf_value(x);
            let total: f64 = leaf.iter().sum();
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

/// Random forest regressor: mean of per-tree leaf values
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestRegressor {
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> leme_common::Result<Self> {
        validate_forest(&trees, n_features, 1, LeafValues::Prediction)?;
        Ok(Self { n_features, trees })
    }
}

impl Regressor for RandomForestRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        check_arity("regressor", self.n_features, x)?;
        let sum: f64 = self.trees.iter().map(|tree| tree.leaf_value(x)[0]).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServingError;

    /// Single split on feature 0 at 1.5
    fn stump(left: Vec<f64>, right: Vec<f64>, root: Vec<f64>) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![1.5, -2.0, -2.0],
            value: vec![root, left, right],
        }
    }

    fn classes() -> Vec<String> {
        vec!["Design".to_string(), "Lawyer".to_string()]
    }

    #[test]
    fn test_classifier_averages_trees() {
        let trees = vec![
            stump(vec![8.0, 2.0], vec![0.0, 10.0], vec![8.0, 12.0]),
            stump(vec![1.0, 0.0], vec![1.0, 1.0], vec![2.0, 1.0]),
        ];
        let model = RandomForestClassifier::new(classes(), 2, trees).unwrap();

        let left = model.predict_proba(&[1.0, 0.0]).unwrap();
        assert!((left[0] - 0.9).abs() < 1e-12);
        assert!((left[1] - 0.1).abs() < 1e-12);
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), "Design");

        let right = model.predict_proba(&[1.5001, 0.0]).unwrap();
        assert!((right[0] - 0.25).abs() < 1e-12);
        assert_eq!(model.predict(&[2.0, 0.0]).unwrap(), "Lawyer");
    }

    #[test]
    fn test_threshold_goes_left() {
        let trees = vec![stump(vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0])];
        let model = RandomForestClassifier::new(classes(), 1, trees).unwrap();
        assert_eq!(model.predict(&[1.5]).unwrap(), "Design");
    }

    #[test]
    fn test_regressor_mean() {
        let trees = vec![
            stump(vec![0.2], vec![0.8], vec![0.5]),
            stump(vec![0.4], vec![1.2], vec![0.8]),
        ];
        let model = RandomForestRegressor::new(1, trees).unwrap();
        assert!((model.predict(&[0.0]).unwrap() - 0.3).abs() < 1e-12);
        assert!((model.predict(&[3.0]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_backward_child_rejected() {
        let mut tree = stump(vec![0.2], vec![0.8], vec![0.5]);
        tree.children_left[0] = 0;
        assert!(RandomForestRegressor::new(1, vec![tree]).is_err());
    }

    #[test]
    fn test_feature_out_of_range_rejected() {
        let mut tree = stump(vec![0.2], vec![0.8], vec![0.5]);
        tree.feature[0] = 3;
        assert!(RandomForestRegressor::new(2, vec![tree]).is_err());
    }

    #[test]
    fn test_value_width_must_match_classes() {
        let tree = stump(vec![1.0], vec![1.0], vec![2.0]);
        assert!(RandomForestClassifier::new(classes(), 1, vec![tree]).is_err());
    }

    #[test]
    fn test_bad_class_weights_rejected_at_load() {
        for leaf in [
            vec![-1.0, 3.0],
            vec![0.0, 0.0],
            vec![f64::NAN, 1.0],
            vec![f64::INFINITY, 1.0],
        ] {
            let tree = stump(leaf.clone(), vec![0.0, 1.0], vec![1.0, 1.0]);
            assert!(
                matches!(
                    RandomForestClassifier::new(classes(), 1, vec![tree]),
                    Err(Error::InvalidArtifact { .. })
                ),
                "{:?}",
                leaf
            );
        }
    }

    #[test]
    fn test_internal_node_weights_not_checked() {
        // Only leaves are ever read
        let tree = stump(vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]);
        assert!(RandomForestClassifier::new(classes(), 1, vec![tree]).is_ok());
    }

    #[test]
    fn test_non_finite_regression_leaf_rejected() {
        let tree = stump(vec![f64::NAN], vec![0.8], vec![0.5]);
        assert!(RandomForestRegressor::new(1, vec![tree]).is_err());

        // Negative regression values are legitimate
        let tree = stump(vec![-0.2], vec![0.8], vec![0.5]);
        assert!(RandomForestRegressor::new(1, vec![tree]).is_ok());
    }

    #[test]
    fn test_arity_checked_before_traversal() {
        let trees = vec![stump(vec![0.2], vec![0.8], vec![0.5])];
        let model = RandomForestRegressor::new(3, trees).unwrap();
        assert!(matches!(
            model.predict(&[1.0]),
            Err(ServingError::FeatureSchemaMismatch { .. })
        ));
    }
}
