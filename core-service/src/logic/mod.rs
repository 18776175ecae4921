//! Logic Module - Business Logic & Engines
//!
//! Prediction path, leaf-first:
//! - `features/` - input schema, validation and encoding
//! - `model/` - frozen scoring model
//! - `risk/` - score → tier
//! - `advice/` - tier (+ features) → guidance
//!
//! Around it:
//! - `analytics/` - statistics over the historical dataset
//! - `dataset/` - dataset reader, prediction log
//! - `config` - engine configuration
//! - `pipeline` - wires the prediction path together

pub mod advice;
pub mod analytics;
pub mod config;
pub mod dataset;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod risk;
