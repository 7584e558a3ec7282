//! Switchboard SDK
//!
//! High-level API for deciding feature switches: the built-in `auth`, `ip`
//! and `host` condition sets, the collaborator traits they consume, and a
//! [`SwitchEngine`] that evaluates [`Switch`] definitions.

pub mod builder;
pub mod builtins;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod switch;

// Re-export main types
pub use builder::SwitchEngineBuilder;
pub use builtins::{
    host_condition_set, ip_bucket_key, ip_condition_set, register_builtins, user_condition_set,
};
pub use collaborators::{
    FixedHostname, GroupResolver, HostnameSource, InternalIps, StaticInternalIps,
    SystemHostname, UserGroups,
};
pub use config::EngineConfig;
pub use engine::{ConditionSetInfo, FieldInfo, SwitchDecision, SwitchEngine};
pub use error::{ConditionIssue, Result, SdkError};
pub use switch::{Switch, SwitchStatus};

// Re-export commonly used types from the core crate
pub use switchboard_core::{
    CombineMode, ConditionData, ConditionRegistry, ConditionSet, Context, ContextKind,
    EvaluationResult, EvaluationTrace, Field, Principal, RequestMetadata, User, Value,
};
