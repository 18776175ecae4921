//! Advice Module - Personalized guidance
//!
//! - `catalog`: static guidance text per tier and per factor
//! - `engine`: selection and ordering of guidance
//! - `types`: output structures

pub mod catalog;
pub mod engine;
pub mod types;

pub use catalog::tier_defaults;
pub use engine::{healthy_ranges, HealthyRange, InvalidFocusError, RecommendationEngine, MAX_FOCUS_FEATURES};
pub use types::{Direction, FeatureContribution, Recommendation};
