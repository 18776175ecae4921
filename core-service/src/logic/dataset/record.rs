use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::logic::features::{FeatureVector, RawInput, ValidationError};
use crate::logic::risk::{ParseTierError, RiskScore, RiskTier};

// ============================================================================
// HISTORICAL RECORD (read side)
// ============================================================================

/// Labeled dataset row
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub features: FeatureVector,
    pub tier: RiskTier,
}

impl HistoricalRecord {
    pub fn new(features: FeatureVector, tier: RiskTier) -> Self {
        Self { features, tier }
    }

    /// Parse one JSONL line
    pub fn from_json_line(line: &str) -> Result<Self, RecordError> {
        let raw: RecordLine = serde_json::from_str(line)?;
        let tier = raw.label()?;
        let features = FeatureVector::construct(&raw.features)?;
        Ok(Self { features, tier })
    }

    /// JSONL form, using the canonical labels
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&RecordLine {
            features: self.features.to_raw(),
            tier: Some(self.tier.as_str().to_string()),
            stressed: None,
        })
    }
}

/// Binary label as stored by older exports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StressedFlag {
    Bool(bool),
    Int(i64),
}

/// On-disk shape of a dataset line
#[derive(Debug, Serialize, Deserialize)]
struct RecordLine {
    features: RawInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stressed: Option<StressedFlag>,
}

impl RecordLine {
    /// `tier` wins over `stressed` when both are present
    fn label(&self) -> Result<RiskTier, RecordError> {
        if let Some(tier) = &self.tier {
            return Ok(tier.parse::<RiskTier>()?);
        }

        match self.stressed {
            Some(StressedFlag::Bool(true)) | Some(StressedFlag::Int(1)) => Ok(RiskTier::High),
            Some(StressedFlag::Bool(false)) | Some(StressedFlag::Int(0)) => Ok(RiskTier::Low),
            Some(StressedFlag::Int(other)) => Err(RecordError::InvalidStressedFlag(other)),
            None => Err(RecordError::MissingLabel),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid features: {0}")]
    Validation(#[from] ValidationError),

    #[error("record has neither 'tier' nor 'stressed'")]
    MissingLabel,

    #[error(transparent)]
    UnknownTier(#[from] ParseTierError),

    #[error("'stressed' must be true/false or 0/1, got {0}")]
    InvalidStressedFlag(i64),
}

// ============================================================================
// PREDICTION RECORD (write side)
// ============================================================================

/// One scored request, as written to the prediction log
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,

    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: Vec<f64>,

    // Model output
    pub model: String,
    pub probabilities: Vec<f64>,

    // Final decision
    pub tier: RiskTier,
}

impl PredictionRecord {
    pub fn new(model: &str, vector: &FeatureVector, score: &RiskScore, tier: RiskTier) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            feature_version: vector.version(),
            layout_hash: vector.layout_hash(),
            features: vector.as_slice().to_vec(),
            model: model.to_string(),
            probabilities: score.probabilities().to_vec(),
            tier,
        }
    }
}
