use thiserror::Error;

/// Rejection of a raw input at the feature boundary.
///
/// Every variant names the offending field so the caller can prompt
/// for a correction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field(s): {}", .fields.join(", "))]
    MissingField { fields: Vec<&'static str> },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("field '{field}' = {value} is out of range: {constraint}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        constraint: String,
    },

    #[error("field '{field}' has an invalid value: {constraint}")]
    InvalidCategory {
        field: &'static str,
        constraint: String,
    },

    #[error("field '{field}' has unknown category '{value}' (allowed: {})", .allowed.join(", "))]
    UnknownCategory {
        field: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },
}

impl ValidationError {
    /// Names of the fields this error refers to
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::MissingField { fields } => fields.clone(),
            ValidationError::UnknownField { field } => vec![field.as_str()],
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidCategory { field, .. }
            | ValidationError::UnknownCategory { field, .. } => vec![*field],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "missing_field",
            ValidationError::UnknownField { .. } => "unknown_field",
            ValidationError::OutOfRange { .. } => "out_of_range",
            ValidationError::InvalidCategory { .. } => "invalid_category",
            ValidationError::UnknownCategory { .. } => "unknown_category",
        }
    }
}
