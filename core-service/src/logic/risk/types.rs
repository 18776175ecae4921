//! Risk Types
//!
//! Core types for risk classification.
//! No classification logic here, only data structures and their checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// RISK TIER
// ============================================================================

/// Ordered risk tiers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// No action needed beyond general wellbeing habits
    Low,
    /// Early signs, self-management recommended
    Moderate,
    /// Strong stress signal, professional support recommended
    High,
}

impl RiskTier {
    /// All tiers in increasing order of risk
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Moderate, RiskTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low risk",
            RiskTier::Moderate => "Moderate risk",
            RiskTier::High => "High risk",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskTier::Low => 0,
            RiskTier::Moderate => 1,
            RiskTier::High => 2,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "#10b981",      // Green
            RiskTier::Moderate => "#f59e0b", // Yellow
            RiskTier::High => "#ef4444",     // Red
        }
    }

    /// Any tier above Low
    pub fn is_elevated(&self) -> bool {
        *self > RiskTier::Low
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk tier '{0}' (expected low, moderate or high)")]
pub struct ParseTierError(pub String);

impl std::str::FromStr for RiskTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RiskTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseTierError(wanted.to_string()))
    }
}

// ============================================================================
// RISK SCORE (from the scoring model)
// ============================================================================

/// Allowed distance of the probability sum from 1
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Malformed model output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidScoreError {
    #[error("risk score has no class probabilities")]
    Empty,

    #[error("class probability {index} is not finite")]
    NonFinite { index: usize },

    #[error("class probability {index} = {value} is outside [0, 1]")]
    OutOfBounds { index: usize, value: f64 },

    #[error("class probabilities sum to {sum}, expected 1")]
    SumMismatch { sum: f64 },
}

/// Class probabilities, ordered by increasing risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    probabilities: Vec<f64>,
}

impl RiskScore {
    /// Build a score, rejecting malformed probabilities
    pub fn new(probabilities: Vec<f64>) -> Result<Self, InvalidScoreError> {
        let score = Self { probabilities };
        score.validate()?;
        Ok(score)
    }

    /// Wrap probabilities without checking them
    ///
    /// Classification still validates, so a malformed score is reported
    /// there instead of being clamped.
    pub fn from_probabilities_unchecked(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    pub fn validate(&self) -> Result<(), InvalidScoreError> {
        if self.probabilities.is_empty() {
            return Err(InvalidScoreError::Empty);
        }

        for (index, &value) in self.probabilities.iter().enumerate() {
            if !value.is_finite() {
                return Err(InvalidScoreError::NonFinite { index });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidScoreError::OutOfBounds { index, value });
            }
        }

        let sum: f64 = self.probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(InvalidScoreError::SumMismatch { sum });
        }

        Ok(())
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of the highest-risk class
    pub fn risk_probability(&self) -> f64 {
        self.probabilities.last().copied().unwrap_or(0.0)
    }

    /// Probability of the most likely class
    pub fn confidence(&self) -> f64 {
        self.probabilities.iter().copied().fold(0.0, f64::max)
    }

    /// Index of the most likely class (first on ties)
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.probabilities.iter().enumerate() {
            if p > self.probabilities[best] {
                best = i;
            }
        }
        best
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order() {
        assert!(RiskTier::Low < RiskTier::Moderate);
        assert!(RiskTier::Moderate < RiskTier::High);
        assert!(!RiskTier::Low.is_elevated());
        assert!(RiskTier::High.is_elevated());
        for (i, tier) in RiskTier::ALL.iter().enumerate() {
            assert_eq!(tier.severity_level() as usize, i);
        }
    }

    #[test]
    fn test_tier_parse_and_serde() {
        assert_eq!("Moderate".parse::<RiskTier>(), Ok(RiskTier::Moderate));
        assert!("severe".parse::<RiskTier>().is_err());
        assert_eq!(serde_json::to_string(&RiskTier::High).unwrap(), "\"high\"");
        let tier: RiskTier = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(tier, RiskTier::Low);
    }

    #[test]
    fn test_score_accessors() {
        let score = RiskScore::new(vec![0.25, 0.75]).unwrap();
        assert_eq!(score.risk_probability(), 0.75);
        assert_eq!(score.confidence(), 0.75);
        assert_eq!(score.predicted_class(), 1);

        let tied = RiskScore::new(vec![0.5, 0.5]).unwrap();
        assert_eq!(tied.predicted_class(), 0);
    }

    #[test]
    fn test_score_validation() {
        assert_eq!(RiskScore::new(vec![]), Err(InvalidScoreError::Empty));
        assert_eq!(
            RiskScore::new(vec![0.5, f64::NAN]),
            Err(InvalidScoreError::NonFinite { index: 1 })
        );
        assert!(matches!(
            RiskScore::new(vec![1.2, -0.2]),
            Err(InvalidScoreError::OutOfBounds { index: 0, .. })
        ));
        assert!(matches!(
            RiskScore::new(vec![0.4, 0.4]),
            Err(InvalidScoreError::SumMismatch { .. })
        ));
        assert!(RiskScore::new(vec![0.3, 0.7 + 5e-7]).is_ok());
    }
}
