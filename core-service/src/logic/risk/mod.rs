//! Risk Module
//!
//! Turns the scoring model's class probabilities into a discrete tier.
//!
//! ## Structure
//! - `types`: RiskTier, RiskScore and their checks
//! - `rules`: Tier thresholds
//! - `classifier`: Classification logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::risk::{classify, RiskScore, RiskTier};
//!
//! let score = RiskScore::new(vec![0.82, 0.18])?;
//! match classify(&score)? {
//!     RiskTier::Low => println!("Keep it up"),
//!     RiskTier::Moderate => println!("Adjust"),
//!     RiskTier::High => println!("Seek support"),
//! }
//! ```

pub mod classifier;
pub mod rules;
pub mod types;

// Re-export main types for convenience
pub use types::{InvalidScoreError, ParseTierError, RiskScore, RiskTier, PROBABILITY_SUM_TOLERANCE};

pub use rules::{InvalidThresholdsError, TierThresholds, HIGH_THRESHOLD, MODERATE_THRESHOLD};

pub use classifier::{classify, RiskClassifier};
