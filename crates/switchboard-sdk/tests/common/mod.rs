//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use switchboard_sdk::{
    Context, EngineConfig, Principal, RequestMetadata, Switch, SwitchDecision, SwitchEngine, User,
};

/// Host name every test engine reports
pub const TEST_HOSTNAME: &str = "web-1.test";

/// Test helper to create a SwitchEngine from inline YAML
pub struct TestEngine {
    config: EngineConfig,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new().with_hostname(TEST_HOSTNAME),
        }
    }

    /// Start from a YAML engine config (the host name is still pinned)
    pub fn from_yaml(config_yaml: &str) -> Self {
        let config = EngineConfig::from_yaml_str(config_yaml.trim())
            .expect("Failed to parse engine config");
        Self {
            config: config.with_hostname(TEST_HOSTNAME),
        }
    }

    pub fn build(self) -> SwitchEngine {
        SwitchEngine::builder()
            .with_config(self.config)
            .build()
            .expect("Failed to build engine")
    }
}

/// Parse a switch definition from YAML
pub fn switch(yaml: &str) -> Switch {
    serde_yaml::from_str(yaml.trim()).expect("Failed to parse switch")
}

pub fn user(id: i64, username: &str) -> Principal {
    Principal::from(User::new(id, username))
}

pub fn request_from(addr: &str) -> RequestMetadata {
    RequestMetadata::from_remote_addr(addr)
}

/// Shorthand for deciding a switch against a principal and a request
pub fn decide(
    engine: &SwitchEngine,
    switch: &Switch,
    principal: Option<&Principal>,
    request: Option<&RequestMetadata>,
) -> bool {
    let mut contexts = Vec::new();
    if let Some(principal) = principal {
        contexts.push(Context::from(principal));
    }
    if let Some(request) = request {
        contexts.push(Context::from(request));
    }
    engine
        .is_active(switch, &contexts)
        .expect("Switch evaluation failed")
}

/// Assertion helpers for decisions
pub trait DecisionAssertions {
    fn assert_enabled(&self);
    fn assert_disabled(&self);
    fn assert_used_default(&self, expected: bool);
}

impl DecisionAssertions for SwitchDecision {
    fn assert_enabled(&self) {
        assert!(self.enabled, "Expected {} to be enabled: {:?}", self.key, self);
    }

    fn assert_disabled(&self) {
        assert!(!self.enabled, "Expected {} to be disabled: {:?}", self.key, self);
    }

    fn assert_used_default(&self, expected: bool) {
        let used_default = self
            .trace
            .as_ref()
            .map(|trace| trace.used_default)
            .unwrap_or(false);
        assert_eq!(
            used_default, expected,
            "Unexpected default usage for {}: {:?}",
            self.key, self
        );
    }
}
