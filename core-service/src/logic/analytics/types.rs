//! Analytics Types
//!
//! Output structures only, all serializable for display.

use serde::Serialize;
use thiserror::Error;

use crate::logic::risk::RiskTier;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("cannot group by '{0}': not a feature name or 'risk_tier'")]
    UnknownGroupField(String),

    #[error("unknown feature '{0}'")]
    UnknownField(String),

    #[error("histogram needs at least one bin")]
    InvalidBins,
}

/// Whether an empty dataset is an error for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPolicy {
    /// Zero records yield an empty summary set
    #[default]
    AllowEmpty,
    /// Zero records fail with `EmptyDataset`
    RequireNonEmpty,
}

// ============================================================================
// TIER COUNTS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

impl TierCounts {
    pub fn add(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Low => self.low += 1,
            RiskTier::Moderate => self.moderate += 1,
            RiskTier::High => self.high += 1,
        }
    }

    pub fn get(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Moderate => self.moderate,
            RiskTier::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high
    }

    /// Share of records above Low (0 when empty)
    pub fn elevated_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.moderate + self.high) as f64 / total as f64
        }
    }
}

impl<'a> FromIterator<&'a RiskTier> for TierCounts {
    fn from_iter<I: IntoIterator<Item = &'a RiskTier>>(iter: I) -> Self {
        let mut counts = TierCounts::default();
        for tier in iter {
            counts.add(*tier);
        }
        counts
    }
}

// ============================================================================
// GROUP SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureStats {
    Numeric {
        mean: f64,
        /// Sample standard deviation (0 with fewer than two records)
        std: f64,
        min: f64,
        max: f64,
    },
    Categorical { counts: Vec<CategoryCount> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub name: &'static str,
    #[serde(flatten)]
    pub stats: FeatureStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub tiers: TierCounts,
    pub elevated_rate: f64,
    pub features: Vec<FeatureSummary>,
}

impl GroupSummary {
    pub fn feature(&self, name: &str) -> Option<&FeatureStats> {
        self.features.iter().find(|f| f.name == name).map(|f| &f.stats)
    }
}

// ============================================================================
// SUPPLEMENTARY VIEWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_records: usize,
    pub tiers: TierCounts,
    pub elevated_rate: f64,
    pub mean_age: f64,
    pub mean_weekly_work_hours: f64,
    pub mean_fatigue_level: f64,
    pub mean_life_satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub field: &'static str,
    pub bins: Vec<HistogramBin>,
}

/// Pearson coefficients; None where a field has no variance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<&'static str>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.fields.iter().position(|f| *f == a)?;
        let j = self.fields.iter().position(|f| *f == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Overall elevated-risk share above the alert level
    HighElevatedRate,
    /// Weekly hours and fatigue move together
    HoursFatigueCorrelation,
    /// Low-income group more often elevated than high-income group
    IncomeGap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub value: f64,
    pub message: String,
}
