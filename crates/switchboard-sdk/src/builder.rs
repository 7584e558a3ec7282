//! Builder for SwitchEngine

use crate::builtins::register_builtins;
use crate::collaborators::{
    FixedHostname, GroupResolver, HostnameSource, InternalIps, StaticInternalIps,
    SystemHostname, UserGroups,
};
use crate::config::EngineConfig;
use crate::engine::{RegistryHandle, SwitchEngine};
use crate::error::{Result, SdkError};
use std::sync::Arc;
use switchboard_core::registry::install_global;
use switchboard_core::{CombineMode, ConditionRegistry, ConditionSet};

/// Builder for creating a SwitchEngine
pub struct SwitchEngineBuilder {
    config: EngineConfig,
    group_resolver: Option<Arc<dyn GroupResolver>>,
    internal_ips: Option<Arc<dyn InternalIps>>,
    hostname_source: Option<Arc<dyn HostnameSource>>,
    condition_sets: Vec<ConditionSet>,
}

impl SwitchEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            group_resolver: None,
            internal_ips: None,
            hostname_source: None,
            condition_sets: Vec::new(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom group membership source
    pub fn with_group_resolver(mut self, resolver: impl GroupResolver + 'static) -> Self {
        self.group_resolver = Some(Arc::new(resolver));
        self
    }

    /// Use a custom internal address source instead of `internal_ips`
    pub fn with_internal_ips(mut self, internal_ips: impl InternalIps + 'static) -> Self {
        self.internal_ips = Some(Arc::new(internal_ips));
        self
    }

    /// Add an internal address
    pub fn add_internal_ip(mut self, addr: impl Into<String>) -> Self {
        self.config.internal_ips.push(addr.into());
        self
    }

    /// Use a custom host name source
    pub fn with_hostname_source(mut self, source: impl HostnameSource + 'static) -> Self {
        self.hostname_source = Some(Arc::new(source));
        self
    }

    /// Fix the host name
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = Some(hostname.into());
        self
    }

    /// Combine mode for switches that do not choose one
    pub fn default_combine(mut self, mode: CombineMode) -> Self {
        self.config.default_combine = mode;
        self
    }

    /// Enable or disable the built-in condition sets
    pub fn enable_builtins(mut self, enabled: bool) -> Self {
        self.config.builtins = enabled;
        self
    }

    /// Install the registry as the process-wide registry on build
    pub fn install_global(mut self, install: bool) -> Self {
        self.config.install_global = install;
        self
    }

    /// Register an application condition set after the built-ins
    pub fn register(mut self, set: ConditionSet) -> Self {
        self.condition_sets.push(set);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<SwitchEngine> {
        self.config.validate()?;

        let mut registry = ConditionRegistry::new();

        if self.config.builtins {
            let groups: Arc<dyn GroupResolver> = match self.group_resolver {
                Some(resolver) => resolver,
                None => Arc::new(UserGroups),
            };
            let internal_ips: Arc<dyn InternalIps> = match self.internal_ips {
                Some(internal_ips) => internal_ips,
                None => Arc::new(
                    StaticInternalIps::parse(&self.config.internal_ips)
                        .map_err(SdkError::ConfigError)?,
                ),
            };
            let hostname: Arc<dyn HostnameSource> =
                match (self.hostname_source, &self.config.hostname) {
                    (Some(source), _) => source,
                    (None, Some(name)) => Arc::new(FixedHostname::new(name.clone())),
                    (None, None) => Arc::new(SystemHostname),
                };
            register_builtins(&mut registry, groups, internal_ips, hostname)?;
        }

        for set in self.condition_sets {
            tracing::info!("Registering condition set {} ({})", set.id(), set.namespace());
            registry.register(set)?;
        }

        tracing::info!(
            "Switch engine ready with {} condition set(s): {}",
            registry.len(),
            registry.namespaces().collect::<Vec<_>>().join(", ")
        );

        let registry = if self.config.install_global {
            tracing::info!("Installing condition registry globally");
            RegistryHandle::Global(install_global(registry)?)
        } else {
            RegistryHandle::Owned(Arc::new(registry))
        };

        Ok(SwitchEngine::new(registry, self.config.default_combine))
    }
}

impl Default for SwitchEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::{ContextKind, CoreError, Field};

    #[test]
    fn test_builder_new() {
        let builder = SwitchEngineBuilder::new();
        assert!(builder.config.builtins);
        assert!(builder.condition_sets.is_empty());
    }

    #[test]
    fn test_builder_registers_builtins() {
        let engine = SwitchEngineBuilder::new()
            .with_hostname("web-1")
            .build()
            .unwrap();
        assert_eq!(
            engine.registry().namespaces().collect::<Vec<_>>(),
            vec!["auth", "ip", "host"]
        );
    }

    #[test]
    fn test_builder_without_builtins() {
        let engine = SwitchEngineBuilder::new()
            .enable_builtins(false)
            .register(
                ConditionSet::builder("tenant")
                    .applies_to(ContextKind::Request)
                    .field(Field::string("HTTP_X_TENANT"))
                    .build(),
            )
            .build()
            .unwrap();
        assert_eq!(
            engine.registry().namespaces().collect::<Vec<_>>(),
            vec!["tenant"]
        );
    }

    #[test]
    fn test_builder_rejects_duplicate_namespace() {
        let result = SwitchEngineBuilder::new()
            .with_hostname("web-1")
            .register(ConditionSet::builder("ip").build())
            .build();
        assert!(matches!(
            result,
            Err(SdkError::Core(CoreError::DuplicateNamespace { .. }))
        ));
    }

    #[test]
    fn test_builder_rejects_bad_internal_ip() {
        let result = SwitchEngineBuilder::new().add_internal_ip("lan").build();
        assert!(matches!(result, Err(SdkError::ConfigError(_))));
    }

    #[test]
    fn test_builder_default_combine() {
        let engine = SwitchEngineBuilder::new()
            .with_hostname("web-1")
            .default_combine(CombineMode::All)
            .build()
            .unwrap();
        assert_eq!(engine.default_combine(), CombineMode::All);
    }
}
