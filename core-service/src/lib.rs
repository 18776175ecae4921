//! Occupational Stress Risk - Core Prediction Engine
//!
//! Validates 14 self-reported work and lifestyle answers, scores them with
//! a frozen classifier, maps the score to a risk tier and derives guidance.
//! Exploratory analytics run separately over a labeled historical dataset.

pub mod constants;
pub mod logic;

pub use logic::advice::{Recommendation, RecommendationEngine};
pub use logic::analytics::{aggregate, AnalyticsAggregator, AnalyticsError, EmptyPolicy, GroupSummary};
pub use logic::config::{ConfigError, EngineConfig};
pub use logic::dataset::{load_jsonl, HistoricalRecord, PredictionLog};
pub use logic::features::{FeatureVector, RawInput, RawValue, ValidationError};
pub use logic::model::{ModelUnavailableError, RiskScorer, ScoringModel};
pub use logic::pipeline::{AssessError, Assessment, StartupError, StressAssessor};
pub use logic::risk::{InvalidScoreError, RiskClassifier, RiskScore, RiskTier};
