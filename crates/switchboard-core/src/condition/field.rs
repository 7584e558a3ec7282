//! Typed condition fields
//!
//! A field knows how to clean a configured value (what an author typed in)
//! and how to compare a cleaned value with the raw value pulled from a
//! context.

use crate::types::{ValidationError, Value};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Size of the percentage bucket space
pub const PERCENT_BUCKETS: i64 = 100;

/// Stable bucket in `0..PERCENT_BUCKETS` for a bucket key.
///
/// Negative keys wrap around with `rem_euclid` so every key lands in range.
pub fn percent_bucket(key: i64) -> u8 {
    key.rem_euclid(PERCENT_BUCKETS) as u8
}

/// Display label derived from a field name (`is_staff` -> `Is staff`)
pub fn label_from_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalized value type a field stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Boolean,
    Date,
    Percent,
    Group,
}

/// Field kinds and their clean/compare rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Exact string match
    String,
    /// Truthiness match
    Boolean,
    /// Context date on or after the configured date
    OnOrAfterDate,
    /// Bucket of the context key below the configured percentage.
    ///
    /// A context value that is not an integer key abstains.
    Percent,
    /// Membership in the configured group
    Group,
    /// String field restricted to IPv4 literals
    IpAddress,
}

impl FieldKind {
    pub fn value_type(self) -> ValueType {
        match self {
            FieldKind::String | FieldKind::IpAddress => ValueType::String,
            FieldKind::Boolean => ValueType::Boolean,
            FieldKind::OnOrAfterDate => ValueType::Date,
            FieldKind::Percent => ValueType::Percent,
            FieldKind::Group => ValueType::Group,
        }
    }
}

/// A named, typed attribute inside a condition set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    label: String,
    kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let label = label_from_name(&name);
        Self { name, label, kind }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn on_or_after_date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::OnOrAfterDate)
    }

    pub fn percent(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Percent)
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Group)
    }

    pub fn ip_address(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::IpAddress)
    }

    /// Replace the label derived from the name
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Field name, also the key in the namespace's condition data
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    /// Normalize a configured value, or reject it.
    pub fn clean(&self, raw: &Value) -> Result<Value, ValidationError> {
        match self.kind {
            FieldKind::String | FieldKind::Group => self.clean_identifier(raw),
            FieldKind::Boolean => self.clean_boolean(raw),
            FieldKind::OnOrAfterDate => self.clean_date(raw),
            FieldKind::Percent => self.clean_percent(raw),
            FieldKind::IpAddress => self.clean_ip_address(raw),
        }
    }

    /// Whether a context value can be compared at all.
    ///
    /// Values that cannot are treated like unavailable ones.
    pub fn accepts(&self, actual: &Value) -> bool {
        match self.kind {
            FieldKind::Percent => actual.as_i64().is_some(),
            _ => true,
        }
    }

    /// Compare a cleaned configured value with the context's value
    pub fn matches(&self, configured: &Value, actual: &Value) -> bool {
        match self.kind {
            FieldKind::String | FieldKind::IpAddress => match (actual, configured.as_str()) {
                (Value::Null, _) | (_, None) => false,
                (Value::String(s), Some(expected)) => s.trim() == expected,
                (other, Some(expected)) => other.to_string() == expected,
            },
            FieldKind::Boolean => actual.is_truthy() == configured.is_truthy(),
            FieldKind::OnOrAfterDate => {
                match (actual.as_str().and_then(parse_date), configured.as_str().and_then(parse_date)) {
                    (Some(actual), Some(threshold)) => actual >= threshold,
                    _ => false,
                }
            }
            FieldKind::Percent => match (actual.as_i64(), configured.as_i64()) {
                (Some(key), Some(threshold)) => i64::from(percent_bucket(key)) < threshold,
                _ => false,
            },
            FieldKind::Group => match (actual, configured.as_str()) {
                (Value::Array(groups), Some(group)) => {
                    groups.iter().any(|g| g.as_str() == Some(group))
                }
                (Value::String(s), Some(group)) => s == group,
                _ => false,
            },
        }
    }

    fn clean_identifier(&self, raw: &Value) -> Result<Value, ValidationError> {
        match raw {
            Value::String(s) if !s.trim().is_empty() => Ok(Value::String(s.trim().to_string())),
            Value::String(_) => Err(ValidationError::InvalidValue {
                field: self.name.clone(),
                message: "value must not be empty".to_string(),
            }),
            other => Err(ValidationError::type_mismatch(
                &self.name,
                "string",
                other.type_name(),
            )),
        }
    }

    fn clean_boolean(&self, raw: &Value) -> Result<Value, ValidationError> {
        let parsed = match raw {
            Value::Bool(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Some(true),
                "false" | "0" | "off" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.map(Value::Bool).ok_or_else(|| {
            ValidationError::type_mismatch(&self.name, "boolean", &describe(raw))
        })
    }

    fn clean_date(&self, raw: &Value) -> Result<Value, ValidationError> {
        let text = raw.as_str().ok_or_else(|| {
            ValidationError::type_mismatch(&self.name, "date string", raw.type_name())
        })?;
        parse_date(text)
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| ValidationError::InvalidDate {
                field: self.name.clone(),
                value: text.to_string(),
            })
    }

    fn clean_percent(&self, raw: &Value) -> Result<Value, ValidationError> {
        let percent = match raw {
            Value::Bool(_) => None,
            other => other.as_i64(),
        }
        .ok_or_else(|| {
            ValidationError::type_mismatch(&self.name, "integer percentage", &describe(raw))
        })?;

        if !(0..=PERCENT_BUCKETS).contains(&percent) {
            return Err(ValidationError::OutOfRange {
                field: self.name.clone(),
                value: percent,
                min: 0,
                max: PERCENT_BUCKETS,
            });
        }
        Ok(Value::Integer(percent))
    }

    fn clean_ip_address(&self, raw: &Value) -> Result<Value, ValidationError> {
        let text = raw.as_str().ok_or_else(|| {
            ValidationError::type_mismatch(&self.name, "IPv4 address", raw.type_name())
        })?;
        text.trim()
            .parse::<Ipv4Addr>()
            .map(|addr| Value::String(addr.to_string()))
            .map_err(|_| ValidationError::InvalidIpAddress {
                field: self.name.clone(),
                value: text.to_string(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.kind)
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (truncated to its date)
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::String(s) => format!("string {:?}", s),
        Value::Integer(i) => format!("integer {}", i),
        other => other.type_name().to_string(),
    }
}
