//! Error types for Switchboard Core

use crate::types::ValidationError;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A configured condition value failed its field's validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An address could not be turned into a bucket key
    #[error("Invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// Another condition set already owns this namespace
    #[error("Namespace already registered: {namespace}")]
    DuplicateNamespace { namespace: String },

    /// The process-wide registry can only be installed once
    #[error("Global condition registry is already installed")]
    GlobalRegistryInstalled,
}

pub type Result<T> = std::result::Result<T, CoreError>;
