//! SwitchEngine - the main entry point for deciding switches

use crate::builder::SwitchEngineBuilder;
use crate::error::{ConditionIssue, Result, SdkError};
use crate::switch::{Switch, SwitchStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use switchboard_core::{
    Applicability, CombineMode, ConditionData, ConditionRegistry, Context, ContextKind,
    EvaluationTrace, Evaluator, NamespaceConditions, ValueType,
};
use tracing::{debug, warn};

/// Registry backing an engine
#[derive(Debug, Clone)]
pub(crate) enum RegistryHandle {
    Owned(Arc<ConditionRegistry>),
    Global(&'static ConditionRegistry),
}

impl RegistryHandle {
    fn get(&self) -> &ConditionRegistry {
        match self {
            RegistryHandle::Owned(registry) => registry.as_ref(),
            RegistryHandle::Global(registry) => *registry,
        }
    }
}

/// Outcome of a switch decision with the reasoning behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchDecision {
    pub key: String,
    pub status: SwitchStatus,
    pub enabled: bool,
    /// Condition evaluation; absent when the status alone decided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<EvaluationTrace>,
}

/// Field description for authoring tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub label: String,
    pub value_type: ValueType,
}

/// Condition set description for authoring tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSetInfo {
    pub id: String,
    pub namespace: String,
    pub group_label: String,
    pub applicability: Applicability,
    pub fields: Vec<FieldInfo>,
}

/// Switch engine
#[derive(Debug, Clone)]
pub struct SwitchEngine {
    registry: RegistryHandle,
    default_combine: CombineMode,
}

impl SwitchEngine {
    pub(crate) fn new(registry: RegistryHandle, default_combine: CombineMode) -> Self {
        Self {
            registry,
            default_combine,
        }
    }

    /// Create a new builder
    pub fn builder() -> SwitchEngineBuilder {
        SwitchEngineBuilder::new()
    }

    pub fn registry(&self) -> &ConditionRegistry {
        self.registry.get()
    }

    pub fn default_combine(&self) -> CombineMode {
        self.default_combine
    }

    /// Decide a switch.
    ///
    /// Selective switches are evaluated against `contexts` plus the empty
    /// context, so host conditions apply to every decision.
    pub fn is_active(&self, switch: &Switch, contexts: &[Context<'_>]) -> Result<bool> {
        let enabled = match switch.status {
            SwitchStatus::Disabled => false,
            SwitchStatus::Global => true,
            SwitchStatus::Selective { default } => self
                .evaluator(switch)
                .is_active_for_any(&switch.conditions, &with_empty_context(contexts), default)?,
        };
        debug!("Switch {} is {}", switch.key, if enabled { "on" } else { "off" });
        Ok(enabled)
    }

    /// Decide a switch and report which namespaces voted
    pub fn explain(&self, switch: &Switch, contexts: &[Context<'_>]) -> Result<SwitchDecision> {
        let (enabled, trace) = match switch.status {
            SwitchStatus::Disabled => (false, None),
            SwitchStatus::Global => (true, None),
            SwitchStatus::Selective { default } => {
                let trace = self.evaluator(switch).explain(
                    &switch.conditions,
                    &with_empty_context(contexts),
                    default,
                )?;
                (trace.enabled, Some(trace))
            }
        };
        Ok(SwitchDecision {
            key: switch.key.clone(),
            status: switch.status,
            enabled,
            trace,
        })
    }

    /// Check every configured value against its field, collecting all problems
    pub fn validate(&self, switch: &Switch) -> Vec<ConditionIssue> {
        let mut issues = Vec::new();

        for namespace in sorted_keys(&switch.conditions) {
            let set = match self.registry().get(namespace) {
                Some(set) => set,
                None => {
                    warn!("Switch {} configures unknown namespace {}", switch.key, namespace);
                    issues.push(ConditionIssue::UnknownNamespace(namespace.clone()));
                    continue;
                }
            };

            let conditions = &switch.conditions[namespace];
            for field in sorted_keys(conditions) {
                let raw = &conditions[field];
                if raw.is_unset() {
                    continue;
                }
                if let Err(error) = set.clean(field, raw) {
                    issues.push(ConditionIssue::Invalid {
                        namespace: namespace.clone(),
                        error,
                    });
                }
            }
        }
        issues
    }

    /// Return a copy of `switch` with every configured value cleaned.
    ///
    /// Unset values are dropped; any validation problem fails the whole switch.
    pub fn clean(&self, switch: &Switch) -> Result<Switch> {
        let issues = self.validate(switch);
        if !issues.is_empty() {
            return Err(SdkError::InvalidSwitch {
                key: switch.key.clone(),
                issues,
            });
        }

        let mut cleaned = ConditionData::new();
        for (namespace, conditions) in &switch.conditions {
            let set = match self.registry().get(namespace) {
                Some(set) => set,
                None => continue,
            };
            let mut values = NamespaceConditions::new();
            for (field, raw) in conditions {
                if raw.is_unset() {
                    continue;
                }
                let value = set
                    .clean(field, raw)
                    .map_err(|error| SdkError::Core(error.into()))?;
                values.insert(field.clone(), value);
            }
            if !values.is_empty() {
                cleaned.insert(namespace.clone(), values);
            }
        }

        Ok(Switch {
            conditions: cleaned,
            ..switch.clone()
        })
    }

    /// Registered condition sets in registration order
    pub fn condition_sets(&self) -> Vec<ConditionSetInfo> {
        self.registry()
            .iter()
            .map(|set| ConditionSetInfo {
                id: set.id().to_string(),
                namespace: set.namespace().to_string(),
                group_label: set.group_label().to_string(),
                applicability: set.applicability().clone(),
                fields: set
                    .fields()
                    .map(|field| FieldInfo {
                        name: field.name().to_string(),
                        label: field.label().to_string(),
                        value_type: field.value_type(),
                    })
                    .collect(),
            })
            .collect()
    }

    fn evaluator(&self, switch: &Switch) -> Evaluator<'_> {
        Evaluator::new(self.registry()).with_mode(switch.combine.unwrap_or(self.default_combine))
    }
}

fn with_empty_context<'c>(contexts: &[Context<'c>]) -> Vec<Context<'c>> {
    let mut all = contexts.to_vec();
    if !all.iter().any(|context| context.kind() == ContextKind::None) {
        all.push(Context::None);
    }
    all
}

fn sorted_keys<V>(map: &std::collections::HashMap<String, V>) -> Vec<&String> {
    let mut keys: Vec<_> = map.keys().collect();
    keys.sort();
    keys
}
