use serde::{Deserialize, Serialize};

use crate::logic::risk::RiskTier;

/// Side of the healthy range a value fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub name: &'static str,
    pub value: f64,
    /// Distance outside the healthy range, as a share of the field's span
    pub deviation: f64,
    pub weight: f64,
    pub importance: f64, // deviation * weight
    pub direction: Direction,
}

/// One guidance line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub tier: RiskTier,
    /// Feature this line targets, None for tier-level guidance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'static str>,
    pub text: String,
}
