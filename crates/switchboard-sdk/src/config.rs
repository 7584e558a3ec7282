//! Configuration types for SwitchEngine

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use switchboard_core::CombineMode;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Addresses the `ip.internal_ip` condition treats as internal
    pub internal_ips: Vec<String>,

    /// Fixed host name for the `host` set (system host name when unset)
    pub hostname: Option<String>,

    /// Combine mode for switches that do not choose one
    pub default_combine: CombineMode,

    /// Register the built-in `auth`, `ip` and `host` condition sets
    pub builtins: bool,

    /// Install the engine's registry as the process-wide registry
    pub install_global: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            internal_ips: Vec::new(),
            hostname: None,
            default_combine: CombineMode::Any,
            builtins: true,
            install_global: false,
        }
    }

    /// Add an internal address
    pub fn with_internal_ip(mut self, addr: impl Into<String>) -> Self {
        self.internal_ips.push(addr.into());
        self
    }

    /// Set a fixed host name
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the default combine mode
    pub fn with_default_combine(mut self, mode: CombineMode) -> Self {
        self.default_combine = mode;
        self
    }

    /// Enable or disable the built-in condition sets
    pub fn with_builtins(mut self, enabled: bool) -> Self {
        self.builtins = enabled;
        self
    }

    /// Install the registry globally on build
    pub fn with_install_global(mut self, install: bool) -> Self {
        self.install_global = install;
        self
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SdkError::ConfigError(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        for (i, addr) in self.internal_ips.iter().enumerate() {
            if addr.trim().parse::<IpAddr>().is_err() {
                return Err(SdkError::ConfigError(format!(
                    "internal_ips[{}] is not an IP address: {:?}",
                    i, addr
                )));
            }
        }
        if let Some(hostname) = &self.hostname {
            if hostname.trim().is_empty() {
                return Err(SdkError::ConfigError(
                    "hostname must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
