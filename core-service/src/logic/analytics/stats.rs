//! Dataset-wide views: overview, histograms, correlations, insights.

use ndarray::{Array2, Axis};

use super::aggregate::{aggregate, bin_index, GroupedSummaries};
use super::types::{
    AnalyticsError, CorrelationMatrix, EmptyPolicy, Histogram, HistogramBin, Insight, InsightKind, Overview,
    TierCounts,
};
use crate::logic::dataset::HistoricalRecord;
use crate::logic::features::layout::feature_index;
use crate::logic::features::schema::{FieldKind, SCHEMA};

/// Elevated-risk share that raises an alert
pub const ELEVATED_RATE_ALERT: f64 = 0.3;

/// |r| above which hours/fatigue correlation is reported
pub const CORRELATION_ALERT: f64 = 0.3;

/// Relative scatter below which a column counts as constant
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Numeric fields plus the ordinal fatigue scale
pub fn correlation_fields() -> Vec<&'static str> {
    SCHEMA
        .iter()
        .filter(|spec| matches!(spec.kind, FieldKind::Numeric { .. }) || spec.name == "fatigue_level")
        .map(|spec| spec.name)
        .collect()
}

/// Read-only analytics over a borrowed dataset
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsAggregator<'a> {
    records: &'a [HistoricalRecord],
}

impl<'a> AnalyticsAggregator<'a> {
    pub fn new(records: &'a [HistoricalRecord]) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Grouped summaries, see [`aggregate`]
    pub fn aggregate(&self, group_by: Option<&str>, policy: EmptyPolicy) -> Result<GroupedSummaries<'a>, AnalyticsError> {
        aggregate(self.records, group_by, policy)
    }

    pub fn overview(&self) -> Result<Overview, AnalyticsError> {
        self.require_records()?;

        let tiers: TierCounts = self.records.iter().map(|r| &r.tier).collect();
        Ok(Overview {
            total_records: self.records.len(),
            elevated_rate: tiers.elevated_rate(),
            tiers,
            mean_age: self.mean_of("age"),
            mean_weekly_work_hours: self.mean_of("weekly_work_hours"),
            mean_fatigue_level: self.mean_of("fatigue_level"),
            mean_life_satisfaction: self.mean_of("life_satisfaction"),
        })
    }

    /// Equal-width histogram over the field's declared domain
    pub fn histogram(&self, field: &str, bins: usize) -> Result<Histogram, AnalyticsError> {
        let index = feature_index(field).ok_or_else(|| AnalyticsError::UnknownField(field.to_string()))?;
        if bins == 0 {
            return Err(AnalyticsError::InvalidBins);
        }

        let spec = &SCHEMA[index];
        let (min, max) = spec.bounds();
        let width = (max - min) / bins as f64;

        let mut counts = vec![0usize; bins];
        for record in self.records {
            counts[bin_index(record.features.as_array()[index], min, max, bins)] += 1;
        }

        Ok(Histogram {
            field: spec.name,
            bins: counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| HistogramBin {
                    lower: min + width * i as f64,
                    upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
                    count,
                })
                .collect(),
        })
    }

    /// Pearson correlation between every pair of `correlation_fields()`
    pub fn correlation_matrix(&self) -> Result<CorrelationMatrix, AnalyticsError> {
        self.require_records()?;

        let fields = correlation_fields();
        let indices: Vec<usize> = fields.iter().filter_map(|f| feature_index(f)).collect();
        let data = Array2::from_shape_fn((self.records.len(), indices.len()), |(row, col)| {
            self.records[row].features.as_array()[indices[col]]
        });

        let means = data.mean_axis(Axis(0)).ok_or(AnalyticsError::EmptyDataset)?;
        let centered = &data - &means;
        let scatter = centered.t().dot(&centered);

        let k = indices.len();
        let n = self.records.len() as f64;
        // Rounding leaves a tiny scatter on constant columns; scale the cutoff to the values
        let varies: Vec<bool> = (0..k)
            .map(|i| scatter[[i, i]] > ZERO_VARIANCE_TOLERANCE * n * means[i].powi(2).max(1.0))
            .collect();

        let values = (0..k)
            .map(|i| {
                (0..k)
                    .map(|j| {
                        let denom = (scatter[[i, i]] * scatter[[j, j]]).sqrt();
                        if varies[i] && varies[j] && denom > 0.0 {
                            Some((scatter[[i, j]] / denom).clamp(-1.0, 1.0))
                        } else {
                            None
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(CorrelationMatrix { fields, values })
    }

    /// Notable patterns in the dataset
    pub fn insights(&self) -> Result<Vec<Insight>, AnalyticsError> {
        self.require_records()?;
        let mut insights = Vec::new();

        let overview = self.overview()?;
        if overview.elevated_rate > ELEVATED_RATE_ALERT {
            insights.push(Insight {
                kind: InsightKind::HighElevatedRate,
                value: overview.elevated_rate,
                message: format!(
                    "Elevated stress risk in {:.1}% of records, above the {:.0}% alert level",
                    overview.elevated_rate * 100.0,
                    ELEVATED_RATE_ALERT * 100.0
                ),
            });
        }

        let matrix = self.correlation_matrix()?;
        if let Some(r) = matrix.get("weekly_work_hours", "fatigue_level") {
            if r.abs() > CORRELATION_ALERT {
                let direction = if r > 0.0 { "positively" } else { "negatively" };
                insights.push(Insight {
                    kind: InsightKind::HoursFatigueCorrelation,
                    value: r,
                    message: format!("Weekly working hours and fatigue are {} correlated (r = {:.2})", direction, r),
                });
            }
        }

        let by_income = self.aggregate(Some("income_level"), EmptyPolicy::AllowEmpty)?;
        let rate_of = |key: &str| by_income.iter().find(|g| g.key == key).map(|g| g.elevated_rate);
        match (rate_of("low"), rate_of("high")) {
            (Some(low), Some(high)) if low > high => insights.push(Insight {
                kind: InsightKind::IncomeGap,
                value: low - high,
                message: format!(
                    "Low-income respondents are more often at elevated risk ({:.1}% vs {:.1}% for high income)",
                    low * 100.0,
                    high * 100.0
                ),
            }),
            (Some(_), Some(_)) => {}
            _ => log::debug!("Income comparison skipped: low or high income group missing"),
        }

        Ok(insights)
    }

    fn require_records(&self) -> Result<(), AnalyticsError> {
        if self.records.is_empty() {
            Err(AnalyticsError::EmptyDataset)
        } else {
            Ok(())
        }
    }

    fn mean_of(&self, field: &str) -> f64 {
        let Some(index) = feature_index(field) else {
            return 0.0;
        };
        let sum: f64 = self.records.iter().map(|r| r.features.as_array()[index]).sum();
        sum / self.records.len().max(1) as f64
    }
}
