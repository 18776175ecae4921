//! Risk Tier Rules & Thresholds
//!
//! Tier boundaries on the probability of the highest-risk class.
//! No classify logic here, only constants and config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// THRESHOLDS (Constants - fixed at runtime)
// ============================================================================

/// At or above this probability = Moderate
pub const MODERATE_THRESHOLD: f64 = 0.3;

/// At or above this probability = High
pub const HIGH_THRESHOLD: f64 = 0.7;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Tier boundaries (inclusive lower bounds of the tier above)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Below this = Low
    pub moderate_min: f64,
    /// At or above this = High, between = Moderate
    pub high_min: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            moderate_min: MODERATE_THRESHOLD,
            high_min: HIGH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid tier thresholds (moderate_min = {moderate_min}, high_min = {high_min}): need 0 < moderate_min < high_min <= 1")]
pub struct InvalidThresholdsError {
    pub moderate_min: f64,
    pub high_min: f64,
}

impl TierThresholds {
    pub fn new(moderate_min: f64, high_min: f64) -> Result<Self, InvalidThresholdsError> {
        let thresholds = Self { moderate_min, high_min };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), InvalidThresholdsError> {
        let ordered = self.moderate_min > 0.0
            && self.moderate_min < self.high_min
            && self.high_min <= 1.0;
        // NaN fails every comparison above
        if ordered {
            Ok(())
        } else {
            Err(InvalidThresholdsError {
                moderate_min: self.moderate_min,
                high_min: self.high_min,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(TierThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_or_out_of_range() {
        assert!(TierThresholds::new(0.7, 0.3).is_err());
        assert!(TierThresholds::new(0.5, 0.5).is_err());
        assert!(TierThresholds::new(0.0, 0.5).is_err());
        assert!(TierThresholds::new(0.2, 1.1).is_err());
        assert!(TierThresholds::new(f64::NAN, 0.5).is_err());
        assert!(TierThresholds::new(0.2, 1.0).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t: TierThresholds = serde_json::from_str(r#"{"high_min": 0.8}"#).unwrap();
        assert_eq!(t.moderate_min, MODERATE_THRESHOLD);
        assert_eq!(t.high_min, 0.8);
    }
}
