//! Feature Schema - Valid domains for every field of the layout
//!
//! One `FieldSpec` per entry of `FEATURE_LAYOUT`, in the same order.
//! Numeric fields carry inclusive bounds; categorical fields carry the
//! fixed label → code table the model was trained with.

use serde::Serialize;

use super::input::RawValue;
use super::layout::{feature_index, FEATURE_COUNT};
use super::validate::ValidationError;

// ============================================================================
// TYPES
// ============================================================================

/// One allowed category with its model encoding
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Category {
    /// Canonical label
    pub label: &'static str,
    /// Value fed to the model
    pub code: f64,
    /// Alternative spellings accepted on input (survey form labels)
    pub aliases: &'static [&'static str],
}

/// Domain of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Numeric {
        min: f64,
        max: f64,
        unit: &'static str,
    },
    Categorical {
        categories: &'static [Category],
        /// Booleans accepted as no/yes
        accepts_flag: bool,
    },
}

/// Declared domain of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Decoded (domain-level) value of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(&'static str),
}

impl FieldValue {
    pub fn to_raw(self) -> RawValue {
        match self {
            FieldValue::Number(x) => RawValue::Number(x),
            FieldValue::Category(label) => RawValue::Text(label.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(x) => write!(f, "{}", x),
            FieldValue::Category(label) => write!(f, "{}", label),
        }
    }
}

// ============================================================================
// CATEGORY TABLES
// ============================================================================

const INCOME_LEVELS: &[Category] = &[
    Category { label: "low", code: -1.0, aliases: &["低"] },
    Category { label: "medium", code: 0.0, aliases: &["中"] },
    Category { label: "high", code: 1.0, aliases: &["高"] },
];

const EDUCATION_LEVELS: &[Category] = &[
    Category { label: "high_school_or_below", code: 0.0, aliases: &["高中及以下"] },
    Category { label: "associate", code: 1.0, aliases: &["大专"] },
    Category { label: "bachelor", code: 2.0, aliases: &["本科"] },
    Category { label: "master_or_above", code: 3.0, aliases: &["硕士及以上"] },
];

const YES_NO: &[Category] = &[
    Category { label: "no", code: 0.0, aliases: &["否"] },
    Category { label: "yes", code: 1.0, aliases: &["是"] },
];

const FATIGUE_LEVELS: &[Category] = &[
    Category { label: "none", code: 0.0, aliases: &["无"] },
    Category { label: "mild", code: 1.0, aliases: &["轻度"] },
    Category { label: "moderate", code: 2.0, aliases: &["中度"] },
    Category { label: "severe", code: 3.0, aliases: &["重度"] },
];

const fn numeric(name: &'static str, description: &'static str, min: f64, max: f64, unit: &'static str) -> FieldSpec {
    FieldSpec { name, description, kind: FieldKind::Numeric { min, max, unit } }
}

const fn categorical(name: &'static str, description: &'static str, categories: &'static [Category]) -> FieldSpec {
    FieldSpec { name, description, kind: FieldKind::Categorical { categories, accepts_flag: false } }
}

const fn flag(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec { name, description, kind: FieldKind::Categorical { categories: YES_NO, accepts_flag: true } }
}

// ============================================================================
// SCHEMA (same order as FEATURE_LAYOUT)
// ============================================================================

pub static SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    numeric("age", "Age", 18.0, 65.0, "years"),
    numeric("work_years", "Total years in employment", 0.0, 50.0, "years"),
    numeric("position_years", "Years in the current position", 0.0, 50.0, "years"),
    categorical("income_level", "Income level", INCOME_LEVELS),
    numeric("weekly_work_hours", "Average working hours per week", 20.0, 80.0, "hours/week"),
    numeric("alcohol_units", "Alcohol consumption", 0.0, 30.0, "standard drinks/week"),
    numeric("moderate_exercise_hours", "Moderate-intensity exercise", 0.0, 20.0, "hours/week"),
    categorical("education_level", "Highest completed education", EDUCATION_LEVELS),
    flag("shift_work", "Works rotating shifts"),
    flag("night_shift", "Works night shifts"),
    flag("sleep_disorder", "Reports a sleep disorder"),
    numeric("vigorous_exercise_hours", "Vigorous-intensity exercise", 0.0, 20.0, "hours/week"),
    numeric("life_satisfaction", "Self-rated life satisfaction", 1.0, 10.0, "score"),
    categorical("fatigue_level", "Self-rated fatigue", FATIGUE_LEVELS),
];

/// Look up the spec of a field by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    feature_index(name).map(|i| &SCHEMA[i])
}

// ============================================================================
// ENCODING
// ============================================================================

impl FieldSpec {
    /// Inclusive (min, max) of the encoded value
    pub fn bounds(&self) -> (f64, f64) {
        match self.kind {
            FieldKind::Numeric { min, max, .. } => (min, max),
            FieldKind::Categorical { categories, .. } => categories.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), c| (lo.min(c.code), hi.max(c.code)),
            ),
        }
    }

    /// Width of the encoded domain
    pub fn span(&self) -> f64 {
        let (lo, hi) = self.bounds();
        hi - lo
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Category labels, empty for numeric fields
    pub fn labels(&self) -> Vec<&'static str> {
        match self.kind {
            FieldKind::Numeric { .. } => Vec::new(),
            FieldKind::Categorical { categories, .. } => categories.iter().map(|c| c.label).collect(),
        }
    }

    /// Validate a raw value and encode it for the model
    pub fn encode(&self, raw: &RawValue) -> Result<f64, ValidationError> {
        match self.kind {
            FieldKind::Numeric { min, max, .. } => self.encode_numeric(raw, min, max),
            FieldKind::Categorical { categories, accepts_flag } => {
                self.encode_category(raw, categories, accepts_flag)
            }
        }
    }

    fn encode_numeric(&self, raw: &RawValue, min: f64, max: f64) -> Result<f64, ValidationError> {
        let value = match raw {
            RawValue::Number(x) => *x,
            RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| ValidationError::InvalidCategory {
                field: self.name,
                constraint: format!("expected a number between {} and {}, got '{}'", min, max, s),
            })?,
            RawValue::Flag(_) => {
                return Err(ValidationError::InvalidCategory {
                    field: self.name,
                    constraint: format!("expected a number between {} and {}, got a boolean", min, max),
                })
            }
            RawValue::Other(v) => {
                return Err(ValidationError::InvalidCategory {
                    field: self.name,
                    constraint: format!("expected a number between {} and {}, got {}", min, max, v),
                })
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: self.name,
                value,
                constraint: "must be a finite number".to_string(),
            });
        }

        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: self.name,
                value,
                constraint: format!("must be between {} and {}", min, max),
            });
        }

        Ok(value)
    }

    fn encode_category(
        &self,
        raw: &RawValue,
        categories: &'static [Category],
        accepts_flag: bool,
    ) -> Result<f64, ValidationError> {
        match raw {
            RawValue::Text(s) => {
                let wanted = s.trim();
                categories
                    .iter()
                    .find(|c| c.label.eq_ignore_ascii_case(wanted) || c.aliases.contains(&wanted))
                    .map(|c| c.code)
                    .ok_or_else(|| self.unknown_category(wanted.to_string(), categories))
            }
            RawValue::Number(x) => {
                if !x.is_finite() || x.fract() != 0.0 {
                    return Err(ValidationError::InvalidCategory {
                        field: self.name,
                        constraint: format!("expected a category label or integer code, got {}", x),
                    });
                }
                categories
                    .iter()
                    .find(|c| c.code == *x)
                    .map(|c| c.code)
                    .ok_or_else(|| self.unknown_category(x.to_string(), categories))
            }
            RawValue::Flag(b) if accepts_flag => Ok(if *b { 1.0 } else { 0.0 }),
            RawValue::Flag(_) => Err(ValidationError::InvalidCategory {
                field: self.name,
                constraint: "expected a category label or integer code, got a boolean".to_string(),
            }),
            RawValue::Other(v) => Err(ValidationError::InvalidCategory {
                field: self.name,
                constraint: format!("expected a category label or integer code, got {}", v),
            }),
        }
    }

    fn unknown_category(&self, value: String, categories: &[Category]) -> ValidationError {
        ValidationError::UnknownCategory {
            field: self.name,
            value,
            allowed: categories.iter().map(|c| c.label).collect(),
        }
    }

    /// Map an encoded value back to its domain value
    pub fn decode(&self, code: f64) -> FieldValue {
        match self.kind {
            FieldKind::Numeric { .. } => FieldValue::Number(code),
            FieldKind::Categorical { categories, .. } => categories
                .iter()
                .find(|c| c.code == code)
                .map(|c| FieldValue::Category(c.label))
                .unwrap_or(FieldValue::Number(code)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::FEATURE_LAYOUT;

    #[test]
    fn test_schema_matches_layout() {
        for (spec, name) in SCHEMA.iter().zip(FEATURE_LAYOUT.iter()) {
            assert_eq!(spec.name, *name);
        }
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        let age = field_spec("age").unwrap();
        assert_eq!(age.encode(&RawValue::Number(18.0)), Ok(18.0));
        assert_eq!(age.encode(&RawValue::Number(65.0)), Ok(65.0));
        assert!(matches!(
            age.encode(&RawValue::Number(17.9)),
            Err(ValidationError::OutOfRange { field: "age", .. })
        ));
        assert!(matches!(
            age.encode(&RawValue::Number(f64::NAN)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_numeric_accepts_numeric_text() {
        let hours = field_spec("weekly_work_hours").unwrap();
        assert_eq!(hours.encode(&RawValue::Text(" 42.5 ".into())), Ok(42.5));
        assert!(matches!(
            hours.encode(&RawValue::Text("forty".into())),
            Err(ValidationError::InvalidCategory { field: "weekly_work_hours", .. })
        ));
        assert!(matches!(
            hours.encode(&RawValue::Flag(true)),
            Err(ValidationError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_category_labels_and_aliases() {
        let income = field_spec("income_level").unwrap();
        assert_eq!(income.encode(&RawValue::Text("LOW".into())), Ok(-1.0));
        assert_eq!(income.encode(&RawValue::Text("高".into())), Ok(1.0));
        assert_eq!(income.encode(&RawValue::Number(0.0)), Ok(0.0));

        let fatigue = field_spec("fatigue_level").unwrap();
        assert_eq!(fatigue.encode(&RawValue::Text("重度".into())), Ok(3.0));
    }

    #[test]
    fn test_unknown_category() {
        let education = field_spec("education_level").unwrap();
        match education.encode(&RawValue::Text("doctorate".into())) {
            Err(ValidationError::UnknownCategory { field, value, allowed }) => {
                assert_eq!(field, "education_level");
                assert_eq!(value, "doctorate");
                assert_eq!(allowed.len(), 4);
            }
            other => panic!("expected unknown category, got {:?}", other),
        }

        assert!(matches!(
            education.encode(&RawValue::Number(7.0)),
            Err(ValidationError::UnknownCategory { .. })
        ));
        assert!(matches!(
            education.encode(&RawValue::Number(1.5)),
            Err(ValidationError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_flag_fields() {
        let night = field_spec("night_shift").unwrap();
        assert_eq!(night.encode(&RawValue::Flag(true)), Ok(1.0));
        assert_eq!(night.encode(&RawValue::Text("否".into())), Ok(0.0));

        let income = field_spec("income_level").unwrap();
        assert!(matches!(
            income.encode(&RawValue::Flag(true)),
            Err(ValidationError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_null_and_nested_values_rejected_per_field() {
        let age = field_spec("age").unwrap();
        assert!(matches!(
            age.encode(&RawValue::Other(serde_json::Value::Null)),
            Err(ValidationError::InvalidCategory { field: "age", .. })
        ));

        let fatigue = field_spec("fatigue_level").unwrap();
        assert!(matches!(
            fatigue.encode(&RawValue::Other(serde_json::json!({"level": "mild"}))),
            Err(ValidationError::InvalidCategory { field: "fatigue_level", .. })
        ));
    }

    #[test]
    fn test_decode() {
        let income = field_spec("income_level").unwrap();
        assert_eq!(income.decode(-1.0), FieldValue::Category("low"));

        let hours = field_spec("weekly_work_hours").unwrap();
        assert_eq!(hours.decode(40.0), FieldValue::Number(40.0));
    }

    #[test]
    fn test_span() {
        assert_eq!(field_spec("income_level").unwrap().span(), 2.0);
        assert_eq!(field_spec("life_satisfaction").unwrap().span(), 9.0);
    }
}
