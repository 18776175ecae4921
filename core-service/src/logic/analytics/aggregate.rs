//! Grouped summaries
//!
//! Group keys are decided up front with one counting pass; each summary
//! is computed only when the iterator reaches it. Iterating again starts
//! over from the first group.

use super::types::{
    AnalyticsError, CategoryCount, EmptyPolicy, FeatureStats, FeatureSummary, GroupSummary, TierCounts,
};
use crate::constants::NUMERIC_GROUP_BINS;
use crate::logic::dataset::HistoricalRecord;
use crate::logic::features::layout::feature_index;
use crate::logic::features::schema::{FieldKind, SCHEMA};
use crate::logic::risk::RiskTier;

/// Group-by key for the tier label
pub const RISK_TIER_KEY: &str = "risk_tier";

/// Key of the single group when no group-by is given
pub const ALL_KEY: &str = "all";

// ============================================================================
// GROUP KEY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    All,
    Tier,
    Feature(usize),
}

impl GroupBy {
    pub fn parse(name: Option<&str>) -> Result<Self, AnalyticsError> {
        match name {
            None => Ok(GroupBy::All),
            Some(RISK_TIER_KEY) => Ok(GroupBy::Tier),
            Some(name) => feature_index(name)
                .map(GroupBy::Feature)
                .ok_or_else(|| AnalyticsError::UnknownGroupField(name.to_string())),
        }
    }

    /// Every possible group label, in display order
    fn labels(&self) -> Vec<String> {
        match *self {
            GroupBy::All => vec![ALL_KEY.to_string()],
            GroupBy::Tier => RiskTier::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            GroupBy::Feature(index) => match SCHEMA[index].kind {
                FieldKind::Categorical { categories, .. } => {
                    categories.iter().map(|c| c.label.to_string()).collect()
                }
                FieldKind::Numeric { min, max, .. } => {
                    let width = (max - min) / NUMERIC_GROUP_BINS as f64;
                    (0..NUMERIC_GROUP_BINS)
                        .map(|bin| {
                            let lower = min + width * bin as f64;
                            if bin + 1 == NUMERIC_GROUP_BINS {
                                format!("[{}, {}]", lower, max)
                            } else {
                                format!("[{}, {})", lower, lower + width)
                            }
                        })
                        .collect()
                }
            },
        }
    }

    /// Index into `labels()` of the group a record belongs to
    fn assign(&self, record: &HistoricalRecord) -> usize {
        match *self {
            GroupBy::All => 0,
            GroupBy::Tier => record.tier.severity_level() as usize,
            GroupBy::Feature(index) => {
                let value = record.features.as_array()[index];
                match SCHEMA[index].kind {
                    FieldKind::Categorical { categories, .. } => {
                        categories.iter().position(|c| c.code == value).unwrap_or(0)
                    }
                    FieldKind::Numeric { min, max, .. } => bin_index(value, min, max, NUMERIC_GROUP_BINS),
                }
            }
        }
    }
}

/// Equal-width bin over [min, max]; max falls in the last bin
pub(crate) fn bin_index(value: f64, min: f64, max: f64, bins: usize) -> usize {
    let width = (max - min) / bins as f64;
    if width <= 0.0 {
        return 0;
    }
    let raw = ((value - min) / width).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(bins - 1)
    }
}

// ============================================================================
// LAZY SUMMARIES
// ============================================================================

/// Restartable sequence of per-group summaries over borrowed records
#[derive(Debug, Clone)]
pub struct GroupedSummaries<'a> {
    records: &'a [HistoricalRecord],
    group_by: GroupBy,
    labels: Vec<String>,
    /// Non-empty groups, in display order
    present: Vec<usize>,
}

impl<'a> GroupedSummaries<'a> {
    fn new(records: &'a [HistoricalRecord], group_by: GroupBy) -> Self {
        let labels = group_by.labels();
        let mut counts = vec![0usize; labels.len()];
        for record in records {
            counts[group_by.assign(record)] += 1;
        }
        let present = (0..labels.len()).filter(|&g| counts[g] > 0).collect();

        Self { records, group_by, labels, present }
    }

    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    /// Keys of the non-empty groups
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.present.iter().map(|&g| self.labels[g].as_str())
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Start (or restart) iteration from the first group
    pub fn iter(&self) -> GroupIter<'_, 'a> {
        GroupIter { summaries: self, position: 0 }
    }

    fn summarize(&self, group: usize) -> GroupSummary {
        let members: Vec<&HistoricalRecord> = self
            .records
            .iter()
            .filter(|r| self.group_by.assign(r) == group)
            .collect();
        summarize_records(self.labels[group].clone(), &members)
    }
}

impl<'s, 'a> IntoIterator for &'s GroupedSummaries<'a> {
    type Item = GroupSummary;
    type IntoIter = GroupIter<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct GroupIter<'s, 'a> {
    summaries: &'s GroupedSummaries<'a>,
    position: usize,
}

impl Iterator for GroupIter<'_, '_> {
    type Item = GroupSummary;

    fn next(&mut self) -> Option<Self::Item> {
        let group = *self.summaries.present.get(self.position)?;
        self.position += 1;
        Some(self.summaries.summarize(group))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.summaries.present.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GroupIter<'_, '_> {}

/// Group records and summarize each group on demand
pub fn aggregate<'a>(
    records: &'a [HistoricalRecord],
    group_by: Option<&str>,
    policy: EmptyPolicy,
) -> Result<GroupedSummaries<'a>, AnalyticsError> {
    let group_by = GroupBy::parse(group_by)?;

    if records.is_empty() && policy == EmptyPolicy::RequireNonEmpty {
        return Err(AnalyticsError::EmptyDataset);
    }

    Ok(GroupedSummaries::new(records, group_by))
}

// ============================================================================
// STATISTICS
// ============================================================================

fn summarize_records(key: String, members: &[&HistoricalRecord]) -> GroupSummary {
    let tiers: TierCounts = members.iter().map(|r| &r.tier).collect();

    let features = SCHEMA
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let values = members.iter().map(|r| r.features.as_array()[index]);
            let stats = match spec.kind {
                FieldKind::Numeric { .. } => numeric_stats(values),
                FieldKind::Categorical { categories, .. } => FeatureStats::Categorical {
                    counts: categories
                        .iter()
                        .map(|c| CategoryCount {
                            label: c.label,
                            count: values.clone().filter(|v| *v == c.code).count(),
                        })
                        .collect(),
                },
            };
            FeatureSummary { name: spec.name, stats }
        })
        .collect();

    GroupSummary {
        key,
        count: members.len(),
        elevated_rate: tiers.elevated_rate(),
        tiers,
        features,
    }
}

fn numeric_stats(values: impl Iterator<Item = f64>) -> FeatureStats {
    let values: Vec<f64> = values.collect();
    let n = values.len();
    if n == 0 {
        return FeatureStats::Numeric { mean: 0.0, std: 0.0, min: 0.0, max: 0.0 };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    FeatureStats::Numeric { mean, std, min, max }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_by() {
        assert_eq!(GroupBy::parse(None), Ok(GroupBy::All));
        assert_eq!(GroupBy::parse(Some("risk_tier")), Ok(GroupBy::Tier));
        assert_eq!(GroupBy::parse(Some("income_level")), Ok(GroupBy::Feature(3)));
        assert_eq!(
            GroupBy::parse(Some("department")),
            Err(AnalyticsError::UnknownGroupField("department".to_string()))
        );
    }

    #[test]
    fn test_bin_index() {
        assert_eq!(bin_index(18.0, 18.0, 65.0, 4), 0);
        assert_eq!(bin_index(29.74, 18.0, 65.0, 4), 0);
        assert_eq!(bin_index(29.75, 18.0, 65.0, 4), 1);
        assert_eq!(bin_index(65.0, 18.0, 65.0, 4), 3);
    }

    #[test]
    fn test_numeric_labels() {
        let labels = GroupBy::Feature(4).labels();
        assert_eq!(labels, vec!["[20, 35)", "[35, 50)", "[50, 65)", "[65, 80]"]);
    }

    #[test]
    fn test_numeric_stats() {
        match numeric_stats([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter()) {
            FeatureStats::Numeric { mean, std, min, max } => {
                assert_eq!(mean, 5.0);
                assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
                assert_eq!((min, max), (2.0, 9.0));
            }
            other => panic!("expected numeric stats, got {:?}", other),
        }
    }
}
