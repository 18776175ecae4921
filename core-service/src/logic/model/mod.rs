//! Model Module - Scoring model
//!
//! - `artifact` - serialized model file and its structural checks
//! - `inference` - loaded model, prediction and status

pub mod artifact;
pub mod inference;

// Re-export common types
pub use artifact::{ArtifactError, EstimatorSpec, ModelArtifact, Scaler, TreeNode, TreeSpec};
pub use inference::{FeatureImportance, ModelStatus, ModelUnavailableError, RiskScorer, ScoringModel};

/// Reference logistic model shipped with the repository
#[cfg(test)]
pub(crate) fn reference_artifact() -> ModelArtifact {
    ModelArtifact::from_json(include_str!("../../../models/reference_model.json"))
        .expect("reference model parses")
}

/// Two-tree forest without scaler, splitting on weekly work hours
#[cfg(test)]
pub(crate) fn forest_artifact() -> ModelArtifact {
    use crate::logic::features::FEATURE_LAYOUT;

    ModelArtifact {
        name: "hours-forest".to_string(),
        version: "0.1.0".to_string(),
        feature_version: crate::logic::features::FEATURE_VERSION,
        feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        layout_hash: None,
        classes: vec!["not_stressed".to_string(), "stressed".to_string()],
        scaler: None,
        feature_importances: None,
        estimator: EstimatorSpec::Forest {
            trees: vec![
                TreeSpec {
                    nodes: vec![
                        TreeNode::Split { feature: 4, threshold: 50.0, left: 1, right: 2 },
                        TreeNode::Leaf { value: vec![8.0, 2.0] },
                        TreeNode::Leaf { value: vec![1.0, 3.0] },
                    ],
                },
                TreeSpec { nodes: vec![TreeNode::Leaf { value: vec![0.0, 1.0] }] },
            ],
        },
    }
}
