//! Decision-tree ensemble classifier
//!
//! Trees are stored as flat node arrays (node 0 is the root). A split sends a
//! row left when `row[feature] <= threshold`. Leaves hold per-class sample
//! counts or weights; the ensemble probability is the mean of the normalized
//! leaf distributions.

use crate::classifier::Classifier;
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// One node of a decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A single decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Random forest loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Load and validate a forest from a JSON file
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading forest classifier from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            error!("Failed to read forest artifact {}: {}", path.display(), e);
            InferenceError::ModelLoad(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a forest from JSON text
    pub fn from_json(raw: &str) -> Result<Self, InferenceError> {
        let forest: Self = serde_json::from_str(raw)
            .map_err(|e| InferenceError::InvalidArtifact(format!("forest: {}", e)))?;
        forest.validate()?;
        Ok(forest)
    }

    /// Check structural soundness so traversal cannot fail or loop
    pub fn validate(&self) -> Result<(), InferenceError> {
        let invalid = |msg: String| Err(InferenceError::InvalidArtifact(msg));

        if self.trees.is_empty() {
            return invalid("forest has no trees".to_string());
        }
        if self.n_features == 0 || self.n_classes == 0 {
            return invalid("forest must have at least one feature and one class".to_string());
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return invalid(format!("tree {} has no nodes", t));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.n_features {
                            return invalid(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, i, feature, self.n_features
                            ));
                        }
                        if threshold.is_nan() {
                            return invalid(format!("tree {} node {} has a NaN threshold", t, i));
                        }
                        // Children strictly after their parent rules out cycles
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return invalid(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, i, child
                                ));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.n_classes {
                            return invalid(format!(
                                "tree {} leaf {} has {} classes, expected {}",
                                t,
                                i,
                                value.len(),
                                self.n_classes
                            ));
                        }
                        let total: f64 = value.iter().sum();
                        if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                            return invalid(format!("tree {} leaf {} has no usable mass", t, i));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf<'a>(tree: &'a DecisionTree, row: &[f64]) -> &'a [f64] {
        let mut idx = 0;
        loop {
            match &tree.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::InferenceFailed(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = Self::leaf(tree, features);
            let total: f64 = leaf.iter().sum();
            for (p, v) in probabilities.iter_mut().zip(leaf) {
                *p += v / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut probabilities {
            *p /= n_trees;
        }
        Ok(probabilities)
    }
}
