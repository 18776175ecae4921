//! Model Artifact - Frozen scoring model on disk
//!
//! JSON representation of a pre-fit classifier: optional standardization,
//! the estimator parameters, and the feature ordering it was fit on.
//! Everything is checked here once so inference never has to.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::layout::{
    validate_feature_names, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION,
};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Serialized model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    pub feature_version: u8,
    /// Ordered feature names the estimator was fit on
    pub feature_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
    /// Class labels, ordered by increasing risk
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<Scaler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
    pub estimator: EstimatorSpec,
}

/// Standardization parameters from training: z = (x - mean) / scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSpec {
    /// Binary logistic regression
    Logistic { coefficients: Vec<f64>, intercept: f64 },
    /// Tree ensemble, probabilities averaged over trees
    Forest { trees: Vec<TreeSpec> },
}

impl EstimatorSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            EstimatorSpec::Logistic { .. } => "logistic",
            EstimatorSpec::Forest { .. } => "forest",
        }
    }
}

/// One decision tree, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when z[feature] <= threshold
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (sample counts or fractions)
    Leaf { value: Vec<f64> },
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Structural defect in an artifact
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArtifactError {
    #[error("artifact declares {count} class(es), need at least 2")]
    TooFewClasses { count: usize },

    #[error("logistic estimator is binary but artifact declares {count} classes")]
    LogisticClasses { count: usize },

    #[error("scaler {field} has {actual} entries, expected {expected}")]
    ScalerLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("scaler scale[{index}] = {value} must be finite and non-zero")]
    InvalidScale { index: usize, value: f64 },

    #[error("{what} is not finite")]
    NonFinite { what: String },

    #[error("logistic estimator has {actual} coefficients, expected {expected}")]
    CoefficientCount { expected: usize, actual: usize },

    #[error("forest estimator has no trees")]
    NoTrees,

    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },

    #[error("tree {tree} node {node} splits on feature {feature}, only {count} features exist")]
    NodeFeature {
        tree: usize,
        node: usize,
        feature: usize,
        count: usize,
    },

    #[error("tree {tree} node {node} points to child {child}, which is not a later node")]
    NodeChild { tree: usize, node: usize, child: usize },

    #[error("tree {tree} leaf {node} has {actual} class weights, expected {expected}")]
    LeafWidth {
        tree: usize,
        node: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tree {tree} leaf {node} weights must be non-negative with a positive sum")]
    LeafWeights { tree: usize, node: usize },

    #[error("feature_importances has {actual} entries, expected {expected}")]
    ImportanceLength { expected: usize, actual: usize },
}

// ============================================================================
// PARSING & VALIDATION
// ============================================================================

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check the declared feature ordering against the engine's layout
    pub fn check_layout(&self) -> Result<(), LayoutMismatchError> {
        if self.feature_version != FEATURE_VERSION {
            return Err(LayoutMismatchError::Version {
                expected: FEATURE_VERSION,
                actual: self.feature_version,
            });
        }

        validate_feature_names(&self.feature_names)?;

        if let Some(hash) = self.layout_hash {
            validate_layout(self.feature_version, hash)?;
        }

        Ok(())
    }

    /// Check internal consistency of the parameters
    pub fn check_structure(&self) -> Result<(), ArtifactError> {
        let class_count = self.classes.len();
        if class_count < 2 {
            return Err(ArtifactError::TooFewClasses { count: class_count });
        }

        if let Some(scaler) = &self.scaler {
            check_scaler(scaler)?;
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != FEATURE_COUNT {
                return Err(ArtifactError::ImportanceLength {
                    expected: FEATURE_COUNT,
                    actual: importances.len(),
                });
            }
            check_finite(importances, "feature_importances")?;
        }

        match &self.estimator {
            EstimatorSpec::Logistic { coefficients, intercept } => {
                if class_count != 2 {
                    return Err(ArtifactError::LogisticClasses { count: class_count });
                }
                if coefficients.len() != FEATURE_COUNT {
                    return Err(ArtifactError::CoefficientCount {
                        expected: FEATURE_COUNT,
                        actual: coefficients.len(),
                    });
                }
                check_finite(coefficients, "coefficients")?;
                if !intercept.is_finite() {
                    return Err(ArtifactError::NonFinite { what: "intercept".to_string() });
                }
            }
            EstimatorSpec::Forest { trees } => {
                if trees.is_empty() {
                    return Err(ArtifactError::NoTrees);
                }
                for (index, tree) in trees.iter().enumerate() {
                    check_tree(index, tree, class_count)?;
                }
            }
        }

        Ok(())
    }
}

fn check_finite(values: &[f64], what: &str) -> Result<(), ArtifactError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(ArtifactError::NonFinite { what: format!("{}[{}]", what, i) }),
        None => Ok(()),
    }
}

fn check_scaler(scaler: &Scaler) -> Result<(), ArtifactError> {
    for (field, values) in [("mean", &scaler.mean), ("scale", &scaler.scale)] {
        if values.len() != FEATURE_COUNT {
            return Err(ArtifactError::ScalerLength {
                field,
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
    }

    check_finite(&scaler.mean, "scaler.mean")?;

    for (index, &value) in scaler.scale.iter().enumerate() {
        if !value.is_finite() || value == 0.0 {
            return Err(ArtifactError::InvalidScale { index, value });
        }
    }

    Ok(())
}

fn check_tree(tree: usize, spec: &TreeSpec, class_count: usize) -> Result<(), ArtifactError> {
    if spec.nodes.is_empty() {
        return Err(ArtifactError::EmptyTree { tree });
    }

    let node_count = spec.nodes.len();
    for (node, entry) in spec.nodes.iter().enumerate() {
        match entry {
            TreeNode::Split { feature, threshold, left, right } => {
                if *feature >= FEATURE_COUNT {
                    return Err(ArtifactError::NodeFeature {
                        tree,
                        node,
                        feature: *feature,
                        count: FEATURE_COUNT,
                    });
                }
                if !threshold.is_finite() {
                    return Err(ArtifactError::NonFinite {
                        what: format!("tree {} node {} threshold", tree, node),
                    });
                }
                // Children strictly after the parent: every walk terminates
                for &child in [left, right] {
                    if child <= node || child >= node_count {
                        return Err(ArtifactError::NodeChild { tree, node, child });
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if value.len() != class_count {
                    return Err(ArtifactError::LeafWidth {
                        tree,
                        node,
                        expected: class_count,
                        actual: value.len(),
                    });
                }
                let sum: f64 = value.iter().sum();
                let valid = value.iter().all(|w| w.is_finite() && *w >= 0.0) && sum > 0.0;
                if !valid {
                    return Err(ArtifactError::LeafWeights { tree, node });
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{layout_hash, FEATURE_LAYOUT};
    use crate::logic::model::{forest_artifact, reference_artifact};

    #[test]
    fn test_reference_artifact_is_valid() {
        let artifact = reference_artifact();
        assert_eq!(artifact.estimator.kind(), "logistic");
        assert!(artifact.check_layout().is_ok());
        assert!(artifact.check_structure().is_ok());
    }

    #[test]
    fn test_forest_artifact_is_valid() {
        let artifact = forest_artifact();
        assert_eq!(artifact.estimator.kind(), "forest");
        assert!(artifact.check_structure().is_ok());
    }

    #[test]
    fn test_tree_node_untagged_parsing() {
        let split: TreeNode =
            serde_json::from_str(r#"{"feature": 4, "threshold": 0.5, "left": 1, "right": 2}"#).unwrap();
        assert!(matches!(split, TreeNode::Split { feature: 4, .. }));

        let leaf: TreeNode = serde_json::from_str(r#"{"value": [3, 1]}"#).unwrap();
        assert_eq!(leaf, TreeNode::Leaf { value: vec![3.0, 1.0] });
    }

    #[test]
    fn test_reordered_features_rejected() {
        let mut artifact = reference_artifact();
        artifact.feature_names.swap(0, 1);
        assert!(matches!(artifact.check_layout(), Err(LayoutMismatchError::Order { index: 0, .. })));
    }

    #[test]
    fn test_wrong_version_or_hash_rejected() {
        let mut artifact = reference_artifact();
        artifact.feature_version = FEATURE_VERSION + 1;
        assert!(matches!(artifact.check_layout(), Err(LayoutMismatchError::Version { .. })));

        let mut artifact = reference_artifact();
        artifact.layout_hash = Some(layout_hash() ^ 1);
        assert!(matches!(artifact.check_layout(), Err(LayoutMismatchError::Hash { .. })));

        let mut artifact = reference_artifact();
        artifact.feature_names = FEATURE_LAYOUT[..10].iter().map(|s| s.to_string()).collect();
        assert!(matches!(artifact.check_layout(), Err(LayoutMismatchError::Count { .. })));
    }

    #[test]
    fn test_structure_errors() {
        let mut artifact = reference_artifact();
        if let Some(scaler) = artifact.scaler.as_mut() {
            scaler.scale[3] = 0.0;
        }
        assert_eq!(
            artifact.check_structure(),
            Err(ArtifactError::InvalidScale { index: 3, value: 0.0 })
        );

        let mut artifact = reference_artifact();
        artifact.estimator = EstimatorSpec::Logistic { coefficients: vec![0.1; 13], intercept: 0.0 };
        assert!(matches!(artifact.check_structure(), Err(ArtifactError::CoefficientCount { .. })));

        let mut artifact = reference_artifact();
        artifact.classes = vec!["all".to_string()];
        assert!(matches!(artifact.check_structure(), Err(ArtifactError::TooFewClasses { count: 1 })));
    }

    #[test]
    fn test_tree_structure_errors() {
        let mut artifact = forest_artifact();
        artifact.estimator = EstimatorSpec::Forest {
            trees: vec![TreeSpec {
                nodes: vec![TreeNode::Split { feature: 0, threshold: 30.0, left: 0, right: 1 }],
            }],
        };
        assert!(matches!(artifact.check_structure(), Err(ArtifactError::NodeChild { child: 0, .. })));

        artifact.estimator = EstimatorSpec::Forest {
            trees: vec![TreeSpec { nodes: vec![TreeNode::Leaf { value: vec![0.0, 0.0] }] }],
        };
        assert!(matches!(artifact.check_structure(), Err(ArtifactError::LeafWeights { .. })));

        artifact.estimator = EstimatorSpec::Forest {
            trees: vec![TreeSpec { nodes: vec![TreeNode::Leaf { value: vec![1.0, 2.0, 3.0] }] }],
        };
        assert!(matches!(artifact.check_structure(), Err(ArtifactError::LeafWidth { actual: 3, .. })));

        artifact.estimator = EstimatorSpec::Forest { trees: vec![] };
        assert_eq!(artifact.check_structure(), Err(ArtifactError::NoTrees));
    }
}
