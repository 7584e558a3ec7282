//! Principal contexts: authenticated users and anonymous visitors

use super::FieldSource;
use crate::types::Value;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable identity, also the percentage bucket key
    pub id: i64,

    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_staff: bool,

    #[serde(default)]
    pub is_superuser: bool,

    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,

    /// Group identifiers the user belongs to
    #[serde(default)]
    pub groups: Vec<String>,

    /// Extra attributes reachable by plain attribute lookup
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create an active, unprivileged user
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: None,
            groups: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn with_staff(mut self, staff: bool) -> Self {
        self.is_staff = staff;
        self
    }

    pub fn with_superuser(mut self, superuser: bool) -> Self {
        self.is_superuser = superuser;
        self
    }

    pub fn with_date_joined(mut self, joined: DateTime<Utc>) -> Self {
        self.date_joined = Some(joined);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl FieldSource for User {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Integer(self.id)),
            "username" => Some(Value::String(self.username.clone())),
            "email" => Some(Value::String(self.email.clone())),
            "is_anonymous" => Some(Value::Bool(false)),
            "is_authenticated" => Some(Value::Bool(true)),
            "is_active" => Some(Value::Bool(self.is_active)),
            "is_staff" => Some(Value::Bool(self.is_staff)),
            "is_superuser" => Some(Value::Bool(self.is_superuser)),
            "date_joined" => self
                .date_joined
                .map(|d| Value::String(d.to_rfc3339_opts(SecondsFormat::Secs, true))),
            "groups" | "is_member_of_group" => Some(Value::Array(
                self.groups.iter().cloned().map(Value::String).collect(),
            )),
            other => self.attributes.get(other).cloned(),
        }
    }
}

/// Who a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    Authenticated(User),
    Anonymous,
}

impl Principal {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Authenticated(user) => Some(user),
            Principal::Anonymous => None,
        }
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Principal::Authenticated(user)
    }
}

impl FieldSource for Principal {
    fn field(&self, name: &str) -> Option<Value> {
        match self {
            Principal::Authenticated(user) => user.field(name),
            // Anonymous visitors only answer the authentication questions
            Principal::Anonymous => match name {
                "is_anonymous" => Some(Value::Bool(true)),
                "is_authenticated" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_field_lookup() {
        let joined = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let user = User::new(42, "alice")
            .with_email("alice@example.com")
            .with_staff(true)
            .with_date_joined(joined)
            .with_group("beta")
            .with_attribute("plan", "pro");

        assert_eq!(user.field("id"), Some(Value::Integer(42)));
        assert_eq!(user.field("email"), Some(Value::from("alice@example.com")));
        assert_eq!(user.field("is_staff"), Some(Value::Bool(true)));
        assert_eq!(user.field("is_anonymous"), Some(Value::Bool(false)));
        assert_eq!(
            user.field("date_joined"),
            Some(Value::from("2024-03-01T12:00:00Z"))
        );
        assert_eq!(user.field("groups"), Some(Value::from(vec!["beta"])));
        assert_eq!(user.field("plan"), Some(Value::from("pro")));
        assert_eq!(user.field("missing"), None);
    }

    #[test]
    fn test_anonymous_fields() {
        let anonymous = Principal::Anonymous;
        assert_eq!(anonymous.field("is_anonymous"), Some(Value::Bool(true)));
        assert_eq!(anonymous.field("username"), None);
        assert_eq!(anonymous.field("is_staff"), None);
    }

    #[test]
    fn test_principal_serde() {
        let principal: Principal = serde_json::from_str(
            r#"{"type": "authenticated", "id": 5, "username": "bob", "groups": ["beta"]}"#,
        )
        .unwrap();
        let user = principal.user().unwrap();
        assert_eq!(user.id, 5);
        assert!(user.is_active);
        assert_eq!(user.groups, vec!["beta".to_string()]);

        let anonymous: Principal = serde_json::from_str(r#"{"type": "anonymous"}"#).unwrap();
        assert!(anonymous.is_anonymous());
    }
}
