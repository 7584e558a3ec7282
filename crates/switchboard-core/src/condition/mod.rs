//! Condition Module
//!
//! Condition sets are the unit switches are configured with. Each set owns a
//! namespace inside a switch's condition data and declares the fields that
//! may appear there:
//!
//! ```yaml
//! auth:
//!   is_staff: true
//!   percent: 25
//! ip:
//!   ip_address: [10.0.0.1, 10.0.0.2]
//! ```
//!
//! ## Evaluation
//! - Every configured field yields `Active`, `Inactive` or `Abstain`.
//! - A field whose context value is unavailable abstains.
//! - An array of configured values matches if any element matches.
//! - Field results are OR-ed: one `Active` field activates the set.
//!
//! ## Overrides
//! A set may replace the rule for a single field name, for example to make
//! `is_active` mean something different for anonymous principals. The
//! override sees the whole namespace and can delegate back to the default
//! rule through [`OverrideScope::default_evaluation`].

mod field;
mod result;
mod set;

pub use field::{label_from_name, percent_bucket, Field, FieldKind, ValueType, PERCENT_BUCKETS};
pub use result::EvaluationResult;
pub use set::{
    Applicability, AttributeAccessor, ConditionSet, ConditionSetBuilder, FieldAccessor,
    FieldOverride, FieldTrace, OverrideScope,
};
