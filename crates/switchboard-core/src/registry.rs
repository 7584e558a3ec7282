//! Condition-set registry
//!
//! The registry maps namespaces to condition sets. It is filled once during
//! startup and only read afterwards, so a built registry can be shared across
//! threads without locking. Applications that want a single process-wide
//! table install one with [`install_global`]; tests build their own.

use crate::condition::ConditionSet;
use crate::context::Context;
use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

static GLOBAL: OnceLock<ConditionRegistry> = OnceLock::new();

/// Registered condition sets, in registration order
#[derive(Debug, Default)]
pub struct ConditionRegistry {
    sets: Vec<Arc<ConditionSet>>,
    by_namespace: HashMap<String, usize>,
}

impl ConditionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a condition set under its namespace.
    ///
    /// Registering the same instance again is a no-op. A different set under
    /// an existing namespace is rejected with
    /// [`CoreError::DuplicateNamespace`].
    pub fn register(&mut self, set: impl Into<Arc<ConditionSet>>) -> Result<()> {
        let set = set.into();
        let namespace = set.namespace().to_string();

        if let Some(&idx) = self.by_namespace.get(&namespace) {
            if Arc::ptr_eq(&self.sets[idx], &set) {
                debug!("Condition set {} already registered", namespace);
                return Ok(());
            }
            return Err(CoreError::DuplicateNamespace { namespace });
        }

        info!(
            "Registered condition set {} ({} fields)",
            namespace,
            set.fields().count()
        );
        self.by_namespace.insert(namespace, self.sets.len());
        self.sets.push(set);
        Ok(())
    }

    /// Register a set, replacing whatever owns its namespace.
    ///
    /// The replacement keeps the original registration position. Returns the
    /// replaced set, if any.
    pub fn register_or_replace(
        &mut self,
        set: impl Into<Arc<ConditionSet>>,
    ) -> Option<Arc<ConditionSet>> {
        let set = set.into();
        match self.by_namespace.get(set.namespace()) {
            Some(&idx) => {
                info!("Replacing condition set {}", set.namespace());
                Some(std::mem::replace(&mut self.sets[idx], set))
            }
            None => {
                self.by_namespace
                    .insert(set.namespace().to_string(), self.sets.len());
                self.sets.push(set);
                None
            }
        }
    }

    /// Look up a set by namespace
    pub fn get(&self, namespace: &str) -> Option<&Arc<ConditionSet>> {
        self.by_namespace.get(namespace).map(|&idx| &self.sets[idx])
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.by_namespace.contains_key(namespace)
    }

    /// Every set that can evaluate `context`, in registration order
    pub fn get_condition_sets_for(&self, context: &Context<'_>) -> Vec<&Arc<ConditionSet>> {
        self.sets
            .iter()
            .filter(|set| set.can_execute(context))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConditionSet>> {
        self.sets.iter()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|set| set.namespace())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Install the process-wide registry. Only the first call succeeds.
pub fn install_global(registry: ConditionRegistry) -> Result<&'static ConditionRegistry> {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if installed {
        info!("Installed global condition registry ({} sets)", global.len());
        Ok(global)
    } else {
        Err(CoreError::GlobalRegistryInstalled)
    }
}

/// The process-wide registry, if one was installed
pub fn global() -> Option<&'static ConditionRegistry> {
    GLOBAL.get()
}
