//! Feature Vector - Validated model input
//!
//! **Versioned, immutable feature vector**
//!
//! The only way to obtain a `FeatureVector` from user data is
//! [`FeatureVector::construct`], which checks presence and domain of all
//! 14 fields and encodes categorical values the way the model expects.

use serde::Serialize;

use super::input::RawInput;
use super::layout::{feature_index, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
use super::schema::{FieldValue, SCHEMA};
use super::validate::ValidationError;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Validated, encoded feature vector in layout order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    version: u8,
    layout_hash: u32,
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Validate a raw input mapping and encode it
    ///
    /// Checks run in this order: missing fields (all reported together),
    /// unknown fields, then each field's domain in layout order.
    pub fn construct(raw: &RawInput) -> Result<Self, ValidationError> {
        let missing: Vec<&'static str> = FEATURE_LAYOUT
            .iter()
            .copied()
            .filter(|name| !raw.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingField { fields: missing });
        }

        if let Some(unknown) = raw.names().find(|name| feature_index(name).is_none()) {
            return Err(ValidationError::UnknownField { field: unknown.to_string() });
        }

        let mut values = [0.0f64; FEATURE_COUNT];
        for (slot, spec) in values.iter_mut().zip(SCHEMA.iter()) {
            // Presence was checked above
            if let Some(value) = raw.get(spec.name) {
                *slot = spec.encode(value)?;
            }
        }

        Ok(Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        })
    }

    /// Encoded values in layout order
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    /// Encoded value by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Encoded value by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Decoded domain value by name
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        feature_index(name).map(|i| SCHEMA[i].decode(self.values[i]))
    }

    /// Iterate (name, decoded value) in layout order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldValue)> + '_ {
        SCHEMA
            .iter()
            .zip(self.values.iter())
            .map(|(spec, &code)| (spec.name, spec.decode(code)))
    }

    /// Raw mapping that constructs back to this exact vector
    pub fn to_raw(&self) -> RawInput {
        self.fields().map(|(name, value)| (name, value.to_raw())).collect()
    }

    /// Copy with one raw field replaced, re-validated
    pub fn with_field(&self, name: &str, value: impl Into<super::input::RawValue>) -> Result<Self, ValidationError> {
        let mut raw = self.to_raw();
        raw.insert(name, value);
        Self::construct(&raw)
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": self.fields()
                .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
