//! Analytics Module - Exploratory statistics over the historical dataset
//!
//! Read-only: every view borrows the records and never changes them.
//!
//! - `aggregate`: grouped summaries, computed lazily per group
//! - `stats`: overview, histograms, correlations, insights
//! - `types`: output structures and errors

pub mod aggregate;
pub mod stats;
pub mod types;


pub use aggregate::{aggregate, GroupBy, GroupIter, GroupedSummaries, ALL_KEY, RISK_TIER_KEY};
pub use stats::{correlation_fields, AnalyticsAggregator};
pub use types::{
    AnalyticsError, CategoryCount, CorrelationMatrix, EmptyPolicy, FeatureStats, FeatureSummary, GroupSummary,
    Histogram, HistogramBin, Insight, InsightKind, Overview, TierCounts,
};
