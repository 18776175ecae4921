//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Environment variable names live here too; `EngineConfig` applies them.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "stress-risk";

/// Default model artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/reference_model.json";

/// Rotate prediction log files at this size
pub const DEFAULT_MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Bins used when a numeric field is the group-by key
pub const NUMERIC_GROUP_BINS: usize = 4;

/// Default histogram resolution
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

// ============================================
// Environment variables
// ============================================

pub const ENV_MODEL_PATH: &str = "STRESS_MODEL_PATH";
pub const ENV_DATASET_PATH: &str = "STRESS_DATASET_PATH";
pub const ENV_PREDICTION_LOG_DIR: &str = "STRESS_PREDICTION_LOG_DIR";
pub const ENV_MODERATE_THRESHOLD: &str = "STRESS_MODERATE_THRESHOLD";
pub const ENV_HIGH_THRESHOLD: &str = "STRESS_HIGH_THRESHOLD";
pub const ENV_MAX_FOCUS_FEATURES: &str = "STRESS_MAX_FOCUS_FEATURES";

// ============================================
// Helper functions
// ============================================

/// Base directory for data written by the engine
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default prediction log directory
pub fn get_prediction_log_dir() -> PathBuf {
    get_data_dir().join("predictions")
}
