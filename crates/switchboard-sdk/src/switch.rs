//! Switch definitions
//!
//! A switch is the unit callers ask about: a key, a status and the condition
//! data the evaluator consults when the status is selective.

use serde::{Deserialize, Serialize};
use switchboard_core::{CombineMode, ConditionData, Value};

/// Switch status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SwitchStatus {
    /// Always off
    Disabled,
    /// Always on
    Global,
    /// Conditions decide; `default` applies when no condition set votes
    Selective {
        #[serde(default)]
        default: bool,
    },
}

impl Default for SwitchStatus {
    fn default() -> Self {
        SwitchStatus::Selective { default: false }
    }
}

/// A feature switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub key: String,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: SwitchStatus,

    /// Combine mode for this switch; the engine default when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine: Option<CombineMode>,

    #[serde(default)]
    pub conditions: ConditionData,
}

impl Switch {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            description: None,
            status: SwitchStatus::default(),
            combine: None,
            conditions: ConditionData::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: SwitchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_combine(mut self, mode: CombineMode) -> Self {
        self.combine = Some(mode);
        self
    }

    /// Add a condition value; repeated values for a field accumulate into a list
    pub fn with_condition(
        mut self,
        namespace: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.add_condition(namespace, field, value);
        self
    }

    /// In-place form of [`with_condition`](Self::with_condition)
    pub fn add_condition(
        &mut self,
        namespace: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        let value = value.into();
        let slot = self
            .conditions
            .entry(namespace.into())
            .or_default()
            .entry(field.into())
            .or_insert(Value::Null);

        *slot = match std::mem::replace(slot, Value::Null) {
            Value::Null => value,
            Value::Array(mut items) => {
                if !items.contains(&value) {
                    items.push(value);
                }
                Value::Array(items)
            }
            existing if existing == value => existing,
            existing => Value::Array(vec![existing, value]),
        };
    }

    /// Remove one configured value, dropping empty fields and namespaces.
    ///
    /// Returns whether anything was removed.
    pub fn remove_condition(&mut self, namespace: &str, field: &str, value: &Value) -> bool {
        let conditions = match self.conditions.get_mut(namespace) {
            Some(conditions) => conditions,
            None => return false,
        };

        let removed = match conditions.get_mut(field) {
            Some(Value::Array(items)) => {
                let before = items.len();
                items.retain(|item| item != value);
                items.len() != before
            }
            Some(existing) if existing == value => {
                *existing = Value::Null;
                true
            }
            _ => false,
        };

        if removed {
            let now_empty = match conditions.get(field) {
                Some(Value::Null) => true,
                Some(Value::Array(items)) => items.is_empty(),
                _ => false,
            };
            if now_empty {
                conditions.remove(field);
            }
            if conditions.is_empty() {
                self.conditions.remove(namespace);
            }
        }
        removed
    }

    /// Drop every condition of a namespace
    pub fn clear_conditions(&mut self, namespace: &str) {
        self.conditions.remove(namespace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_switch_is_selective_off() {
        let switch = Switch::new("new_checkout");
        assert_eq!(switch.status, SwitchStatus::Selective { default: false });
        assert!(switch.conditions.is_empty());
        assert!(switch.combine.is_none());
    }

    #[test]
    fn test_conditions_accumulate() {
        let switch = Switch::new("beta_ui")
            .with_condition("auth", "is_member_of_group", "beta")
            .with_condition("auth", "is_member_of_group", "gamma")
            .with_condition("auth", "is_member_of_group", "beta")
            .with_condition("ip", "percent", 25i64);

        assert_eq!(
            switch.conditions["auth"]["is_member_of_group"],
            Value::from(vec!["beta", "gamma"])
        );
        assert_eq!(switch.conditions["ip"]["percent"], Value::Integer(25));
    }

    #[test]
    fn test_remove_condition() {
        let mut switch = Switch::new("beta_ui")
            .with_condition("auth", "username", "alice")
            .with_condition("auth", "username", "bob")
            .with_condition("host", "hostname", "web-1");

        assert!(switch.remove_condition("auth", "username", &Value::from("alice")));
        assert_eq!(
            switch.conditions["auth"]["username"],
            Value::from(vec!["bob"])
        );

        assert!(switch.remove_condition("host", "hostname", &Value::from("web-1")));
        assert!(!switch.conditions.contains_key("host"));

        assert!(!switch.remove_condition("ip", "percent", &Value::Integer(1)));
    }

    #[test]
    fn test_status_serde() {
        let yaml = r#"
key: new_checkout
status:
  type: selective
  default: true
conditions:
  auth:
    is_staff: true
"#;
        let switch: Switch = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(switch.status, SwitchStatus::Selective { default: true });
        assert_eq!(switch.conditions["auth"]["is_staff"], Value::Bool(true));

        let json = serde_json::to_value(Switch::new("off").with_status(SwitchStatus::Disabled))
            .unwrap();
        assert_eq!(json["status"]["type"], "disabled");
    }
}
