//! The `host` condition set: the machine the engine runs on

use crate::collaborators::HostnameSource;
use std::sync::Arc;
use switchboard_core::{ConditionSet, Context, ContextKind, Field, FieldAccessor, Result, Value};

struct HostAccessor {
    source: Arc<dyn HostnameSource>,
}

impl FieldAccessor for HostAccessor {
    fn get_field_value(&self, _context: &Context<'_>, field: &str) -> Result<Option<Value>> {
        match field {
            "hostname" => Ok(self.source.hostname().map(Value::String)),
            _ => Ok(None),
        }
    }
}

/// Build the `host` set; it only runs against the empty context
pub fn host_condition_set(source: Arc<dyn HostnameSource>) -> ConditionSet {
    ConditionSet::builder("host")
        .group_label("Host")
        .applies_to(ContextKind::None)
        .accessor(HostAccessor { source })
        .field(Field::string("hostname"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::FixedHostname;
    use std::collections::HashMap;
    use switchboard_core::{EvaluationResult, Principal, User};

    #[test]
    fn test_hostname_matches() {
        let set = host_condition_set(Arc::new(FixedHostname::new("web-1")));
        let data = HashMap::from([(
            "hostname".to_string(),
            Value::from(vec!["web-1", "web-2"]),
        )]);

        assert_eq!(
            set.evaluate(&Context::None, &data).unwrap(),
            EvaluationResult::Active
        );

        let other = host_condition_set(Arc::new(FixedHostname::new("batch-1")));
        assert_eq!(
            other.evaluate(&Context::None, &data).unwrap(),
            EvaluationResult::Inactive
        );
    }

    #[test]
    fn test_only_runs_without_an_object() {
        let set = host_condition_set(Arc::new(FixedHostname::new("web-1")));
        let principal = Principal::from(User::new(1, "alice"));
        assert!(set.can_execute(&Context::None));
        assert!(!set.can_execute(&Context::from(&principal)));
    }
}
