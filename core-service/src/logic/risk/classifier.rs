//! Risk Classifier
//!
//! Classification logic only: no types, no policy.
//! Input: RiskScore
//! Output: RiskTier

use super::rules::{InvalidThresholdsError, TierThresholds};
use super::types::{InvalidScoreError, RiskScore, RiskTier};

/// Maps model output to a tier with fixed, ordered boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskClassifier {
    thresholds: TierThresholds,
}

impl RiskClassifier {
    pub fn new(thresholds: TierThresholds) -> Result<Self, InvalidThresholdsError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    /// Classify a model score
    ///
    /// CORE LOGIC - pure and deterministic. Boundaries are inclusive lower
    /// bounds of the riskier tier.
    pub fn classify(&self, score: &RiskScore) -> Result<RiskTier, InvalidScoreError> {
        score.validate()?;
        Ok(self.tier_for(score.risk_probability()))
    }

    /// Classify a bare probability of the highest-risk class
    pub fn classify_probability(&self, probability: f64) -> Result<RiskTier, InvalidScoreError> {
        if !probability.is_finite() {
            return Err(InvalidScoreError::NonFinite { index: 0 });
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(InvalidScoreError::OutOfBounds { index: 0, value: probability });
        }
        Ok(self.tier_for(probability))
    }

    /// Inclusive lower bound of a tier
    pub fn tier_floor(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => 0.0,
            RiskTier::Moderate => self.thresholds.moderate_min,
            RiskTier::High => self.thresholds.high_min,
        }
    }

    fn tier_for(&self, probability: f64) -> RiskTier {
        if probability >= self.thresholds.high_min {
            RiskTier::High
        } else if probability >= self.thresholds.moderate_min {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }
}

/// Classify with the default thresholds
pub fn classify(score: &RiskScore) -> Result<RiskTier, InvalidScoreError> {
    RiskClassifier::default().classify(score)
}

// ============================================================================
// TESTS
// ============================================================================
