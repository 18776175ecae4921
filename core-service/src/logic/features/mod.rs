//! Features Module - Input validation and encoding
//!
//! Turns the raw survey answers into the fixed-order numeric vector the
//! scoring model consumes.
//!
//! - `layout` - authoritative field order, version and hash
//! - `schema` - per-field domains and category encodings
//! - `input` - raw field → value mapping from the caller
//! - `validate` - rejection reasons
//! - `vector` - the validated `FeatureVector`

pub mod input;
pub mod layout;
pub mod schema;
pub mod validate;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use input::{RawInput, RawValue};
pub use layout::{
    feature_index, feature_name, layout_hash, validate_feature_names, LayoutInfo,
    LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use schema::{field_spec, FieldKind, FieldSpec, FieldValue, SCHEMA};
pub use validate::ValidationError;
pub use vector::FeatureVector;

/// A complete, valid, low-risk profile used across unit tests
#[cfg(test)]
pub(crate) fn sample_input() -> RawInput {
    RawInput::new()
        .with("age", 30)
        .with("work_years", 5)
        .with("position_years", 2)
        .with("income_level", "medium")
        .with("weekly_work_hours", 40)
        .with("alcohol_units", 0)
        .with("moderate_exercise_hours", 3)
        .with("education_level", "bachelor")
        .with("shift_work", "no")
        .with("night_shift", "no")
        .with("sleep_disorder", "no")
        .with("vigorous_exercise_hours", 2)
        .with("life_satisfaction", 8)
        .with("fatigue_level", "none")
}
