//! SDK error types

use switchboard_core::{CoreError, ValidationError};
use thiserror::Error;

/// A problem found while checking a switch's condition data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionIssue {
    /// No registered condition set owns the namespace
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    /// A configured value failed validation
    #[error("{namespace}: {error}")]
    Invalid {
        namespace: String,
        error: ValidationError,
    },
}

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Core error (validation, registration, malformed addresses)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Switch condition data did not validate
    #[error("Invalid switch '{key}': {} issue(s)", .issues.len())]
    InvalidSwitch {
        key: String,
        issues: Vec<ConditionIssue>,
    },
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
