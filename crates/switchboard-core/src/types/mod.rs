//! Type system for Switchboard
//!
//! This module contains:
//! - Value types shared by configured condition data and contexts
//! - Validation errors raised while cleaning configured values

pub mod validator;
pub mod value;

pub use validator::ValidationError;
pub use value::Value;
