//! Property tests for feature construction
//!
//! Any in-domain input must construct, and the vector must survive a trip
//! back through its raw form unchanged.

use proptest::prelude::*;

use super::input::{RawInput, RawValue};
use super::layout::FEATURE_LAYOUT;
use super::schema::{FieldKind, SCHEMA};
use super::validate::ValidationError;
use super::vector::FeatureVector;

/// One in-domain raw value per field, numeric fields at 0.5 resolution
fn valid_input() -> impl Strategy<Value = RawInput> {
    let per_field: Vec<BoxedStrategy<RawValue>> = SCHEMA
        .iter()
        .map(|spec| match spec.kind {
            FieldKind::Numeric { min, max, .. } => {
                let steps = ((max - min) * 2.0) as u32;
                (0..=steps)
                    .prop_map(move |s| RawValue::Number(min + s as f64 * 0.5))
                    .boxed()
            }
            FieldKind::Categorical { categories, .. } => prop::sample::select(categories.to_vec())
                .prop_map(|c| RawValue::Text(c.label.to_string()))
                .boxed(),
        })
        .collect();

    per_field.prop_map(|values| {
        FEATURE_LAYOUT
            .iter()
            .copied()
            .zip(values)
            .collect::<RawInput>()
    })
}

proptest! {
    #[test]
    fn test_valid_input_always_constructs(raw in valid_input()) {
        prop_assert!(FeatureVector::construct(&raw).is_ok());
    }

    #[test]
    fn test_round_trip_preserves_vector(raw in valid_input()) {
        let vector = FeatureVector::construct(&raw).unwrap();
        let rebuilt = FeatureVector::construct(&vector.to_raw()).unwrap();
        prop_assert_eq!(rebuilt, vector);
    }

    #[test]
    fn test_removed_field_is_reported(raw in valid_input(), index in 0usize..FEATURE_LAYOUT.len()) {
        let mut raw = raw;
        let name = FEATURE_LAYOUT[index];
        raw.remove(name);
        prop_assert_eq!(
            FeatureVector::construct(&raw),
            Err(ValidationError::MissingField { fields: vec![name] })
        );
    }

    #[test]
    fn test_out_of_range_numeric_rejected(raw in valid_input(), excess in 0.01f64..1000.0) {
        for spec in SCHEMA.iter() {
            if let FieldKind::Numeric { max, .. } = spec.kind {
                let bad = raw.clone().with(spec.name, max + excess);
                let is_out_of_range = matches!(
                    FeatureVector::construct(&bad),
                    Err(ValidationError::OutOfRange { field, .. }) if field == spec.name
                );
                prop_assert!(is_out_of_range);
            }
        }
    }
}
