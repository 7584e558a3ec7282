//! Switchboard Core - condition evaluation for feature switches
//!
//! This crate provides the pieces a switch decision is built from:
//! - Value types for configured and context data
//! - Typed fields with validation and comparison rules
//! - Namespaced condition sets bound to context kinds
//! - The condition-set registry
//! - The evaluator that combines per-namespace results into a decision

pub mod condition;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use condition::{
    percent_bucket, Applicability, AttributeAccessor, ConditionSet, ConditionSetBuilder,
    EvaluationResult, Field, FieldAccessor, FieldKind, FieldOverride, FieldTrace,
    OverrideScope, ValueType, PERCENT_BUCKETS,
};
pub use context::{Context, ContextKind, FieldSource, Principal, RequestMetadata, User};
pub use error::{CoreError, Result};
pub use evaluator::{
    CombineMode, ConditionData, EvaluationTrace, Evaluator, NamespaceConditions, NamespaceTrace,
};
pub use registry::ConditionRegistry;
pub use types::{ValidationError, Value};
