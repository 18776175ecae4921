//! Engine Configuration
//!
//! Defaults from `constants`, then an optional JSON file, then
//! environment variables. The result is validated before use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_MODEL_PATH, ENV_DATASET_PATH, ENV_HIGH_THRESHOLD, ENV_MAX_FOCUS_FEATURES, ENV_MODEL_PATH,
    ENV_MODERATE_THRESHOLD, ENV_PREDICTION_LOG_DIR,
};
use crate::logic::advice::{InvalidFocusError, RecommendationEngine, MAX_FOCUS_FEATURES};
use crate::logic::risk::{InvalidThresholdsError, TierThresholds};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error(transparent)]
    Thresholds(#[from] InvalidThresholdsError),

    #[error(transparent)]
    Focus(#[from] InvalidFocusError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model artifact (JSON)
    pub model_path: PathBuf,
    /// Historical dataset (JSONL), needed only for analytics
    pub dataset_path: Option<PathBuf>,
    /// Prediction log directory; logging is off when unset
    pub prediction_log_dir: Option<PathBuf>,
    pub thresholds: TierThresholds,
    pub max_focus_features: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            dataset_path: None,
            prediction_log_dir: None,
            thresholds: TierThresholds::default(),
            max_focus_features: MAX_FOCUS_FEATURES,
        }
    }
}

impl EngineConfig {
    /// Load from an optional file, apply the process environment, validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MODEL_PATH) {
            self.model_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_DATASET_PATH) {
            self.dataset_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_PREDICTION_LOG_DIR) {
            self.prediction_log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_MODERATE_THRESHOLD) {
            self.thresholds.moderate_min = parse_env(ENV_MODERATE_THRESHOLD, value)?;
        }
        if let Some(value) = lookup(ENV_HIGH_THRESHOLD) {
            self.thresholds.high_min = parse_env(ENV_HIGH_THRESHOLD, value)?;
        }
        if let Some(value) = lookup(ENV_MAX_FOCUS_FEATURES) {
            self.max_focus_features = parse_env(ENV_MAX_FOCUS_FEATURES, value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        RecommendationEngine::new(self.max_focus_features)?;
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
