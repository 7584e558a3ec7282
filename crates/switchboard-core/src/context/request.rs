//! Request metadata contexts

use super::FieldSource;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata of an incoming request, keyed like CGI variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMetadata {
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl RequestMetadata {
    /// Key holding the client address
    pub const REMOTE_ADDR: &'static str = "REMOTE_ADDR";

    pub fn new() -> Self {
        Self::default()
    }

    /// Request coming from the given client address
    pub fn from_remote_addr(addr: impl Into<String>) -> Self {
        Self::new().with(Self::REMOTE_ADDR, addr)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.get(Self::REMOTE_ADDR)
    }
}

impl FieldSource for RequestMetadata {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(Value::from)
    }
}
