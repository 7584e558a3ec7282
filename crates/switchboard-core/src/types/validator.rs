//! Validation errors for configured condition values

use thiserror::Error;

/// Validation error raised when a configured value cannot be cleaned
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Type mismatch
    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Value has the right type but is not acceptable
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Numeric value outside the allowed range
    #[error("Value {value} for field '{field}' is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Not an IPv4 literal
    #[error("Invalid IPv4 address for field '{field}': {value:?}")]
    InvalidIpAddress { field: String, value: String },

    /// Not a calendar date
    #[error("Invalid date for field '{field}': {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    /// Field not declared by the condition set
    #[error("Unknown field: {field}")]
    UnknownField { field: String },
}

impl ValidationError {
    /// Field the error was raised for
    pub fn field(&self) -> &str {
        match self {
            ValidationError::TypeMismatch { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidIpAddress { field, .. }
            | ValidationError::InvalidDate { field, .. }
            | ValidationError::UnknownField { field } => field,
        }
    }

    pub(crate) fn type_mismatch(field: &str, expected: &str, actual: &str) -> Self {
        ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
