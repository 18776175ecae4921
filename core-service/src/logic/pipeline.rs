//! Assessment Pipeline
//!
//! raw input → FeatureVector → RiskScore → RiskTier → recommendations.
//! The scorer is injected; nothing here reaches for global state.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::advice::{FeatureContribution, Recommendation, RecommendationEngine};
use super::config::EngineConfig;
use super::dataset::{PredictionLog, PredictionRecord};
use super::features::{FeatureVector, RawInput, ValidationError};
use super::model::{ModelUnavailableError, RiskScorer, ScoringModel};
use super::risk::{InvalidScoreError, RiskClassifier, RiskScore, RiskTier};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("model produced an invalid score: {0}")]
    InvalidScore(#[from] InvalidScoreError),

    #[error("input is not an object of field values: {reason}")]
    MalformedInput { reason: String },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Model(#[from] ModelUnavailableError),

    #[error(transparent)]
    Config(#[from] super::config::ConfigError),

    #[error("failed to open prediction log: {0}")]
    PredictionLog(#[from] std::io::Error),
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Everything the caller shows for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub tier: RiskTier,
    pub tier_label: &'static str,
    pub color: &'static str,
    pub risk_probability: f64,
    pub confidence: f64,
    pub predicted_class: Option<String>,
    pub score: RiskScore,
    pub contributors: Vec<FeatureContribution>,
    pub recommendations: Vec<Recommendation>,
}

// ============================================================================
// ASSESSOR
// ============================================================================

pub struct StressAssessor {
    scorer: Arc<dyn RiskScorer>,
    classifier: RiskClassifier,
    advisor: RecommendationEngine,
    prediction_log: Option<PredictionLog>,
}

impl StressAssessor {
    pub fn new(scorer: Arc<dyn RiskScorer>, classifier: RiskClassifier, advisor: RecommendationEngine) -> Self {
        Self {
            scorer,
            classifier,
            advisor,
            prediction_log: None,
        }
    }

    /// Load the model and wire every component from configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let model = ScoringModel::load(&config.model_path)?;

        let classifier = RiskClassifier::new(config.thresholds).map_err(super::config::ConfigError::from)?;
        let advisor =
            RecommendationEngine::new(config.max_focus_features).map_err(super::config::ConfigError::from)?;

        let mut assessor = Self::new(Arc::new(model), classifier, advisor);
        if let Some(dir) = &config.prediction_log_dir {
            assessor = assessor.with_prediction_log(PredictionLog::open(dir)?);
        }
        Ok(assessor)
    }

    pub fn with_prediction_log(mut self, log: PredictionLog) -> Self {
        self.prediction_log = Some(log);
        self
    }

    /// Validate, score, classify and advise
    pub fn assess(&self, raw: &RawInput) -> Result<Assessment, AssessError> {
        let vector = FeatureVector::construct(raw).map_err(|e| {
            log::debug!("Rejected input: {}", e);
            e
        })?;
        self.assess_vector(&vector)
    }

    pub fn assess_vector(&self, vector: &FeatureVector) -> Result<Assessment, AssessError> {
        let score = self.scorer.predict(vector);
        let tier = self.classifier.classify(&score).map_err(|e| {
            log::error!("Model '{}' returned a malformed score: {}", self.scorer.model_name(), e);
            e
        })?;

        if let Some(log) = &self.prediction_log {
            let record = PredictionRecord::new(self.scorer.model_name(), vector, &score, tier);
            if let Err(e) = log.append(&record) {
                log::error!("Failed to append to prediction log: {}", e);
            }
        }

        let contributors = if tier.is_elevated() {
            self.advisor.contributors(vector)
        } else {
            Vec::new()
        };

        Ok(Assessment {
            tier,
            tier_label: tier.display_name(),
            color: tier.color(),
            risk_probability: score.risk_probability(),
            confidence: score.confidence(),
            predicted_class: self.scorer.classes().get(score.predicted_class()).cloned(),
            recommendations: self.advisor.recommend(tier, Some(vector)),
            contributors,
            score,
        })
    }

    /// Assess many inputs; one bad input fails only its own entry
    pub fn assess_batch(&self, inputs: &[RawInput]) -> Vec<Result<Assessment, AssessError>> {
        inputs.iter().map(|raw| self.assess(raw)).collect()
    }

    /// Assess decoded JSON items; an item that is not an object fails alone
    pub fn assess_json_batch(&self, items: Vec<serde_json::Value>) -> Vec<Result<Assessment, AssessError>> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let raw: RawInput = serde_json::from_value(item).map_err(|e| {
                    log::debug!("Rejected batch item {}: {}", index, e);
                    AssessError::MalformedInput { reason: e.to_string() }
                })?;
                self.assess(&raw)
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
