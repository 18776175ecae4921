//! Inference Engine - Frozen model scoring
//!
//! Loads a `ModelArtifact` once, checks it against the feature layout,
//! and scores `FeatureVector`s. The model is immutable after load; only
//! the latency/count stats change, through atomics.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::Serialize;
use thiserror::Error;

use super::artifact::{ArtifactError, EstimatorSpec, ModelArtifact, TreeNode};
use crate::logic::features::layout::{layout_hash, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::features::FeatureVector;
use crate::logic::risk::RiskScore;

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// The model cannot serve predictions; fatal at startup
#[derive(Debug, Error)]
pub enum ModelUnavailableError {
    #[error("model artifact not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model artifact is incompatible with the feature layout: {0}")]
    Layout(#[from] LayoutMismatchError),

    #[error("model artifact is malformed: {0}")]
    Malformed(#[from] ArtifactError),
}

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// Anything that turns a validated vector into class probabilities
pub trait RiskScorer: Send + Sync {
    fn predict(&self, vector: &FeatureVector) -> RiskScore;

    /// Class labels, ordered by increasing risk
    fn classes(&self) -> &[String];

    fn model_name(&self) -> &str;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model status for display
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub model_name: String,
    pub model_version: String,
    pub estimator: String,
    pub source: String,
    pub classes: Vec<String>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

/// One entry of the declared feature importances
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

/// Estimator parameters in evaluation form
#[derive(Debug)]
enum Estimator {
    Logistic { coefficients: Array1<f64>, intercept: f64 },
    Forest { trees: Vec<Vec<TreeNode>>, class_count: usize },
}

/// Latency stats
#[derive(Debug, Default)]
struct InferenceStats {
    latency_sum_us: AtomicU64,
    count: AtomicU64,
}

// ============================================================================
// SCORING MODEL
// ============================================================================

/// Loaded, validated, read-only scoring model
#[derive(Debug)]
pub struct ScoringModel {
    artifact: ModelArtifact,
    mean: Array1<f64>,
    scale: Array1<f64>,
    estimator: Estimator,
    source: String,
    loaded_at: DateTime<Utc>,
    stats: InferenceStats,
}

impl ScoringModel {
    /// Load a JSON artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelUnavailableError> {
        let path = path.as_ref();
        log::info!("Loading model artifact from: {}", path.display());

        if !path.exists() {
            return Err(ModelUnavailableError::NotFound { path: path.to_path_buf() });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ModelUnavailableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = ModelArtifact::from_json(&content)?;

        Self::build(artifact, path.display().to_string())
    }

    /// Wrap an in-memory artifact
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelUnavailableError> {
        Self::build(artifact, "<memory>".to_string())
    }

    fn build(artifact: ModelArtifact, source: String) -> Result<Self, ModelUnavailableError> {
        artifact.check_layout()?;
        artifact.check_structure()?;

        let (mean, scale) = match &artifact.scaler {
            Some(scaler) => (Array1::from(scaler.mean.clone()), Array1::from(scaler.scale.clone())),
            None => (Array1::zeros(FEATURE_COUNT), Array1::ones(FEATURE_COUNT)),
        };

        let estimator = match &artifact.estimator {
            EstimatorSpec::Logistic { coefficients, intercept } => Estimator::Logistic {
                coefficients: Array1::from(coefficients.clone()),
                intercept: *intercept,
            },
            EstimatorSpec::Forest { trees } => Estimator::Forest {
                trees: trees.iter().map(|t| t.nodes.clone()).collect(),
                class_count: artifact.classes.len(),
            },
        };

        log::info!(
            "Model '{}' v{} loaded ({} estimator, {} classes)",
            artifact.name,
            artifact.version,
            artifact.estimator.kind(),
            artifact.classes.len()
        );

        Ok(Self {
            artifact,
            mean,
            scale,
            estimator,
            source,
            loaded_at: Utc::now(),
            stats: InferenceStats::default(),
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    // ------------------------------------------------------------------------
    // PREDICTION
    // ------------------------------------------------------------------------

    /// Score one vector
    pub fn predict(&self, vector: &FeatureVector) -> RiskScore {
        let start_time = Instant::now();

        let z = self.standardize(vector);
        let probabilities = match &self.estimator {
            Estimator::Logistic { coefficients, intercept } => {
                let p = sigmoid(coefficients.dot(&z) + intercept);
                vec![1.0 - p, p]
            }
            Estimator::Forest { trees, class_count } => predict_forest(trees, *class_count, &z),
        };

        // Track metrics
        let elapsed = start_time.elapsed().as_micros() as u64;
        self.stats.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.stats.count.fetch_add(1, Ordering::Relaxed);

        RiskScore::from_probabilities_unchecked(probabilities)
    }

    /// Score many vectors; each result depends only on its own input
    pub fn predict_batch(&self, vectors: &[FeatureVector]) -> Vec<RiskScore> {
        vectors.iter().map(|v| self.predict(v)).collect()
    }

    fn standardize(&self, vector: &FeatureVector) -> Array1<f64> {
        let x = Array1::from(vector.as_slice().to_vec());
        (x - &self.mean) / &self.scale
    }

    // ------------------------------------------------------------------------
    // INFO
    // ------------------------------------------------------------------------

    /// Declared importances, most important first (empty when not declared)
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        let Some(importances) = &self.artifact.feature_importances else {
            return Vec::new();
        };

        let mut ranked: Vec<FeatureImportance> = FEATURE_LAYOUT
            .iter()
            .zip(importances.iter())
            .map(|(&feature, &importance)| FeatureImportance { feature, importance })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }

    pub fn status(&self) -> ModelStatus {
        let sum = self.stats.latency_sum_us.load(Ordering::Relaxed);
        let count = self.stats.count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        ModelStatus {
            model_name: self.artifact.name.clone(),
            model_version: self.artifact.version.clone(),
            estimator: self.artifact.estimator.kind().to_string(),
            source: self.source.clone(),
            classes: self.artifact.classes.clone(),
            feature_version: self.artifact.feature_version,
            layout_hash: layout_hash(),
            loaded_at: self.loaded_at,
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

impl RiskScorer for ScoringModel {
    fn predict(&self, vector: &FeatureVector) -> RiskScore {
        ScoringModel::predict(self, vector)
    }

    fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    fn model_name(&self) -> &str {
        &self.artifact.name
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Mean of the normalized leaf distributions reached in each tree
fn predict_forest(trees: &[Vec<TreeNode>], class_count: usize, z: &Array1<f64>) -> Vec<f64> {
    let mut totals = vec![0.0f64; class_count];

    for nodes in trees {
        let leaf = walk_tree(nodes, z);
        let sum: f64 = leaf.iter().sum();
        for (total, weight) in totals.iter_mut().zip(leaf) {
            *total += weight / sum;
        }
    }

    let tree_count = trees.len() as f64;
    totals.iter().map(|t| t / tree_count).collect()
}

/// Children always point forward (checked at load), so this terminates
fn walk_tree<'a>(nodes: &'a [TreeNode], z: &Array1<f64>) -> &'a [f64] {
    let mut index = 0;
    loop {
        match &nodes[index] {
            TreeNode::Split { feature, threshold, left, right } => {
                index = if z[*feature] <= *threshold { *left } else { *right };
            }
            TreeNode::Leaf { value } => return value,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{sample_input, FeatureVector};
    use crate::logic::model::{forest_artifact, reference_artifact};
    use crate::logic::risk::{classify, RiskTier};

    fn reference_model() -> ScoringModel {
        ScoringModel::from_artifact(reference_artifact()).unwrap()
    }

    fn sample_vector() -> FeatureVector {
        FeatureVector::construct(&sample_input()).unwrap()
    }

    #[test]
    fn test_normal_profile_scores_low() {
        let score = reference_model().predict(&sample_vector());
        assert!(score.validate().is_ok());
        assert!(score.risk_probability() < 0.1, "got {}", score.risk_probability());
        assert_eq!(classify(&score), Ok(RiskTier::Low));
    }

    #[test]
    fn test_long_hours_and_low_satisfaction_score_high() {
        let model = reference_model();
        let baseline = model.predict(&sample_vector());

        let stressed = sample_vector()
            .with_field("weekly_work_hours", 80)
            .and_then(|v| v.with_field("life_satisfaction", 1))
            .unwrap();
        let score = model.predict(&stressed);

        assert!(score.risk_probability() > 0.75, "got {}", score.risk_probability());
        assert!(classify(&score).unwrap() > classify(&baseline).unwrap());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = reference_model();
        let vector = sample_vector();
        let first = model.predict(&vector);
        for _ in 0..10 {
            assert_eq!(model.predict(&vector), first);
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let model = reference_model();
        let a = sample_vector();
        let b = a.with_field("fatigue_level", "severe").unwrap();
        let batch = model.predict_batch(&[a.clone(), b.clone()]);
        assert_eq!(batch, vec![model.predict(&a), model.predict(&b)]);
    }

    #[test]
    fn test_forest_averages_leaf_distributions() {
        let model = ScoringModel::from_artifact(forest_artifact()).unwrap();

        // 40 h/week: tree 1 leaf [8, 2] → 0.2, tree 2 leaf [0, 1] → 1.0
        let score = model.predict(&sample_vector());
        assert!((score.risk_probability() - 0.6).abs() < 1e-12);
        assert!(score.validate().is_ok());

        // 60 h/week: tree 1 leaf [1, 3] → 0.75
        let busy = sample_vector().with_field("weekly_work_hours", 60).unwrap();
        let score = model.predict(&busy);
        assert!((score.risk_probability() - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_incompatible_artifact_at_load() {
        let mut artifact = reference_artifact();
        artifact.feature_names.reverse();
        assert!(matches!(
            ScoringModel::from_artifact(artifact),
            Err(ModelUnavailableError::Layout(_))
        ));

        let mut artifact = reference_artifact();
        artifact.estimator = EstimatorSpec::Logistic { coefficients: vec![], intercept: 0.0 };
        assert!(matches!(
            ScoringModel::from_artifact(artifact),
            Err(ModelUnavailableError::Malformed(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, reference_artifact().to_json_pretty().unwrap()).unwrap();

        let model = ScoringModel::load(&path).unwrap();
        assert_eq!(model.model_name(), "occupational-stress-logit");
        assert_eq!(model.classes().len(), 2);

        assert!(matches!(
            ScoringModel::load(dir.path().join("missing.json")),
            Err(ModelUnavailableError::NotFound { .. })
        ));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ScoringModel::load(&path), Err(ModelUnavailableError::Parse(_))));
    }

    #[test]
    fn test_feature_importance_sorted() {
        let ranked = reference_model().feature_importance();
        assert_eq!(ranked.len(), FEATURE_COUNT);
        assert_eq!(ranked[0].feature, "weekly_work_hours");
        assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));

        let bare = ScoringModel::from_artifact(forest_artifact()).unwrap();
        assert!(bare.feature_importance().is_empty());
    }

    #[test]
    fn test_status_counts_inferences() {
        let model = reference_model();
        model.predict(&sample_vector());
        model.predict(&sample_vector());

        let status = model.status();
        assert_eq!(status.inference_count, 2);
        assert_eq!(status.estimator, "logistic");
        assert_eq!(status.source, "<memory>");
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoringModel>();
    }
}
