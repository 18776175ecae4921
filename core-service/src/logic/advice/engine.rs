//! Recommendation Engine
//!
//! Tier defaults, optionally preceded by guidance for the factors that
//! deviate most from their healthy reference range.

use serde::Serialize;
use thiserror::Error;

use super::catalog::{feature_guidance, tier_defaults};
use super::types::{Direction, FeatureContribution, Recommendation};
use crate::logic::features::layout::feature_index;
use crate::logic::features::schema::field_spec;
use crate::logic::features::FeatureVector;
use crate::logic::risk::RiskTier;

/// Default and upper limit of feature-specific lines
pub const MAX_FOCUS_FEATURES: usize = 3;

/// Healthy reference range of a modifiable factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthyRange {
    pub feature: &'static str,
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

// Weights: 1.0 = standard, 1.5 = strongest stress association.
// Bounds are in the encoded domain (binary: 0 = no, income: -1 = low).
static HEALTHY_RANGES: [HealthyRange; 10] = [
    HealthyRange { feature: "weekly_work_hours", min: 20.0, max: 45.0, weight: 1.5 },
    HealthyRange { feature: "alcohol_units", min: 0.0, max: 7.0, weight: 1.0 },
    HealthyRange { feature: "moderate_exercise_hours", min: 2.5, max: 20.0, weight: 1.0 },
    HealthyRange { feature: "vigorous_exercise_hours", min: 1.25, max: 20.0, weight: 0.8 },
    HealthyRange { feature: "life_satisfaction", min: 7.0, max: 10.0, weight: 1.5 },
    HealthyRange { feature: "fatigue_level", min: 0.0, max: 1.0, weight: 1.3 },
    HealthyRange { feature: "sleep_disorder", min: 0.0, max: 0.0, weight: 1.2 },
    HealthyRange { feature: "night_shift", min: 0.0, max: 0.0, weight: 1.0 },
    HealthyRange { feature: "shift_work", min: 0.0, max: 0.0, weight: 0.8 },
    HealthyRange { feature: "income_level", min: 0.0, max: 1.0, weight: 0.6 },
];

pub fn healthy_ranges() -> &'static [HealthyRange] {
    &HEALTHY_RANGES
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("max focus features must be between 1 and 3, got {0}")]
pub struct InvalidFocusError(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationEngine {
    max_focus: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self { max_focus: MAX_FOCUS_FEATURES }
    }
}

impl RecommendationEngine {
    pub fn new(max_focus: usize) -> Result<Self, InvalidFocusError> {
        if !(1..=MAX_FOCUS_FEATURES).contains(&max_focus) {
            return Err(InvalidFocusError(max_focus));
        }
        Ok(Self { max_focus })
    }

    pub fn max_focus(&self) -> usize {
        self.max_focus
    }

    /// Guidance for a tier, feature-specific lines first
    ///
    /// Never fails and never returns an empty list. Feature lines are only
    /// added for elevated tiers.
    pub fn recommend(&self, tier: RiskTier, vector: Option<&FeatureVector>) -> Vec<Recommendation> {
        let mut out = Vec::new();

        if let Some(vector) = vector.filter(|_| tier.is_elevated()) {
            for contribution in self.contributors(vector).into_iter().take(self.max_focus) {
                if let Some(text) = feature_guidance(contribution.name, contribution.direction) {
                    out.push(Recommendation {
                        tier,
                        focus: Some(contribution.name),
                        text: text.to_string(),
                    });
                }
            }
        }

        out.extend(tier_defaults(tier).iter().map(|text| Recommendation {
            tier,
            focus: None,
            text: text.to_string(),
        }));

        out
    }

    /// Factors outside their healthy range, largest weighted deviation first
    pub fn contributors(&self, vector: &FeatureVector) -> Vec<FeatureContribution> {
        let mut contributions: Vec<FeatureContribution> = HEALTHY_RANGES
            .iter()
            .filter_map(|range| contribution(range, vector))
            .collect();

        // Sort by importance DESC; stable, so ties keep table order
        contributions.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        contributions
    }
}

fn contribution(range: &HealthyRange, vector: &FeatureVector) -> Option<FeatureContribution> {
    let value = feature_index(range.feature).and_then(|i| vector.get(i))?;
    let span = field_spec(range.feature)?.span();

    let (distance, direction) = if value > range.max {
        (value - range.max, Direction::Above)
    } else if value < range.min {
        (range.min - value, Direction::Below)
    } else {
        return None;
    };

    let deviation = distance / span;
    Some(FeatureContribution {
        name: range.feature,
        value,
        deviation,
        weight: range.weight,
        importance: deviation * range.weight,
        direction,
    })
}

// ============================================================================
// TESTS
// ============================================================================
