//! Switch evaluation
//!
//! The evaluator takes a switch's condition data, finds the registered sets
//! that can run against the supplied context(s), and combines their votes:
//!
//! - a set votes only if its namespace is configured and it does not abstain;
//! - [`CombineMode::Any`] (the default) enables the switch on the first
//!   active namespace;
//! - [`CombineMode::All`] requires every voting namespace to be active;
//! - with no votes at all the caller's default decides.

use crate::condition::{EvaluationResult, FieldTrace};
use crate::context::{Context, ContextKind};
use crate::error::Result;
use crate::registry::ConditionRegistry;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configured values of one namespace, keyed by field name
pub type NamespaceConditions = HashMap<String, Value>;

/// A switch's conditions, keyed by namespace
pub type ConditionData = HashMap<String, NamespaceConditions>;

/// How per-namespace votes combine into a decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// Enabled if any voting namespace is active
    #[default]
    Any,
    /// Enabled only if every voting namespace is active
    All,
}

/// One namespace's contribution to a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceTrace {
    pub namespace: String,
    pub context: ContextKind,
    pub result: EvaluationResult,
    pub fields: Vec<FieldTrace>,
}

/// Full account of how a decision was reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationTrace {
    pub enabled: bool,
    /// True when no namespace voted and the default was returned
    pub used_default: bool,
    pub mode: CombineMode,
    pub namespaces: Vec<NamespaceTrace>,
}

impl EvaluationTrace {
    /// Namespaces that voted active
    pub fn active_namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces
            .iter()
            .filter(|ns| ns.result.is_active())
            .map(|ns| ns.namespace.as_str())
    }
}

/// Evaluates condition data against contexts using a registry
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r ConditionRegistry,
    mode: CombineMode,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r ConditionRegistry) -> Self {
        Self {
            registry,
            mode: CombineMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CombineMode {
        self.mode
    }

    pub fn registry(&self) -> &'r ConditionRegistry {
        self.registry
    }

    /// Decide a switch for a single context
    pub fn is_active(
        &self,
        data: &ConditionData,
        context: &Context<'_>,
        default: bool,
    ) -> Result<bool> {
        self.is_active_for_any(data, std::slice::from_ref(context), default)
    }

    /// Decide a switch with votes pooled across several contexts
    pub fn is_active_for_any(
        &self,
        data: &ConditionData,
        contexts: &[Context<'_>],
        default: bool,
    ) -> Result<bool> {
        let mut voted = false;

        for context in contexts {
            for set in self.registry.get_condition_sets_for(context) {
                let conditions = match data.get(set.namespace()) {
                    Some(conditions) => conditions,
                    None => continue,
                };

                let vote = match set.evaluate(context, conditions)?.as_bool() {
                    Some(vote) => vote,
                    None => continue,
                };
                voted = true;

                match (self.mode, vote) {
                    (CombineMode::Any, true) => {
                        tracing::debug!("Namespace {} enabled the switch", set.namespace());
                        return Ok(true);
                    }
                    (CombineMode::All, false) => {
                        tracing::debug!("Namespace {} disabled the switch", set.namespace());
                        return Ok(false);
                    }
                    _ => {}
                }
            }
        }

        if !voted {
            tracing::debug!("No namespace voted, using default {}", default);
            return Ok(default);
        }
        // Every vote agreed with the mode's fallthrough: all false for Any, all true for All
        Ok(self.mode == CombineMode::All)
    }

    /// Evaluate every applicable namespace and record the outcome.
    ///
    /// Unlike [`is_active_for_any`](Self::is_active_for_any) this does not
    /// stop at the first decisive vote, so the trace lists every namespace.
    pub fn explain(
        &self,
        data: &ConditionData,
        contexts: &[Context<'_>],
        default: bool,
    ) -> Result<EvaluationTrace> {
        let mut namespaces = Vec::new();

        for context in contexts {
            for set in self.registry.get_condition_sets_for(context) {
                let conditions = match data.get(set.namespace()) {
                    Some(conditions) => conditions,
                    None => continue,
                };
                let (result, fields) = set.evaluate_traced(context, conditions)?;
                namespaces.push(NamespaceTrace {
                    namespace: set.namespace().to_string(),
                    context: context.kind(),
                    result,
                    fields,
                });
            }
        }

        let votes: Vec<bool> = namespaces
            .iter()
            .filter_map(|ns| ns.result.as_bool())
            .collect();
        let used_default = votes.is_empty();
        let enabled = if used_default {
            default
        } else {
            match self.mode {
                CombineMode::Any => votes.iter().any(|&v| v),
                CombineMode::All => votes.iter().all(|&v| v),
            }
        };

        Ok(EvaluationTrace {
            enabled,
            used_default,
            mode: self.mode,
            namespaces,
        })
    }
}
