//! The `auth` condition set: attributes of the principal

use crate::collaborators::GroupResolver;
use std::sync::Arc;
use switchboard_core::{
    ConditionSet, Context, ContextKind, EvaluationResult, Field, FieldAccessor, OverrideScope,
    Result, Value,
};

/// Principal attributes, with the user id standing in as the percent bucket key
struct UserAccessor;

impl FieldAccessor for UserAccessor {
    fn get_field_value(&self, context: &Context<'_>, field: &str) -> Result<Option<Value>> {
        match field {
            "percent" => Ok(context.user().map(|user| Value::Integer(user.id))),
            other => Ok(context.lookup(other)),
        }
    }
}

/// Build the `auth` set
pub fn user_condition_set(groups: Arc<dyn GroupResolver>) -> ConditionSet {
    ConditionSet::builder("user")
        .namespace("auth")
        .group_label("User")
        .applies_to(ContextKind::Principal)
        .accessor(UserAccessor)
        .field(Field::percent("percent"))
        .field(Field::string("username"))
        .field(Field::string("email"))
        .field(Field::boolean("is_anonymous").with_label("Anonymous"))
        .field(Field::boolean("is_active").with_label("Active"))
        .field(Field::boolean("is_staff").with_label("Staff"))
        .field(Field::boolean("is_superuser").with_label("Superuser"))
        .field(Field::on_or_after_date("date_joined").with_label("Joined on or after"))
        .field(Field::group("is_member_of_group").with_label("Is member of group"))
        .override_field("is_active", is_active)
        .override_field("is_anonymous", is_anonymous)
        .override_field(
            "is_member_of_group",
            move |scope: &OverrideScope<'_>| is_member_of_group(groups.as_ref(), scope),
        )
        .build()
}

/// Anonymous visitors are never "active" users; they follow `is_anonymous` instead
fn is_active(scope: &OverrideScope<'_>) -> Result<EvaluationResult> {
    match scope.context.principal() {
        Some(principal) if principal.is_anonymous() => match scope.condition("is_anonymous") {
            Some(configured) => any_truthy(scope, "is_anonymous", configured),
            None => Ok(EvaluationResult::Abstain),
        },
        _ => scope.default_evaluation(),
    }
}

fn is_anonymous(scope: &OverrideScope<'_>) -> Result<EvaluationResult> {
    match scope.context.principal() {
        Some(principal) if principal.is_anonymous() => {
            any_truthy(scope, scope.field.name(), scope.configured)
        }
        _ => Ok(EvaluationResult::Abstain),
    }
}

/// Active when the cleaned value, or any element of a cleaned list, is true
fn any_truthy(
    scope: &OverrideScope<'_>,
    field: &str,
    configured: &Value,
) -> Result<EvaluationResult> {
    let active = match scope.set.clean(field, configured)? {
        Value::Array(items) => items.iter().any(Value::is_truthy),
        single => single.is_truthy(),
    };
    Ok(active.into())
}

fn is_member_of_group(
    groups: &dyn GroupResolver,
    scope: &OverrideScope<'_>,
) -> Result<EvaluationResult> {
    let user = match scope.context.user() {
        Some(user) => user,
        None => return Ok(EvaluationResult::Abstain),
    };

    let configured = scope.set.clean(scope.field.name(), scope.configured)?;
    let member = match &configured {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|group| groups.is_member(user, group)),
        single => single
            .as_str()
            .map_or(false, |group| groups.is_member(user, group)),
    };
    tracing::debug!("User {} member of {}: {}", user.id, configured, member);
    Ok(member.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::UserGroups;
    use std::collections::HashMap;
    use switchboard_core::{Principal, User};

    fn set() -> ConditionSet {
        user_condition_set(Arc::new(UserGroups))
    }

    fn conditions(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_order_and_labels() {
        let set = set();
        let names: Vec<_> = set.fields().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "percent",
                "username",
                "email",
                "is_anonymous",
                "is_active",
                "is_staff",
                "is_superuser",
                "date_joined",
                "is_member_of_group",
            ]
        );
        assert_eq!(set.namespace(), "auth");
        assert_eq!(set.group_label(), "User");
        assert_eq!(set.field("date_joined").unwrap().label(), "Joined on or after");
    }

    #[test]
    fn test_percent_uses_user_id() {
        let set = set();
        let data = conditions(&[("percent", Value::Integer(50))]);

        // bucket = id mod 100
        let low = Principal::from(User::new(149, "low"));
        let high = Principal::from(User::new(151, "high"));
        assert_eq!(
            set.evaluate(&Context::from(&low), &data).unwrap(),
            EvaluationResult::Active
        );
        assert_eq!(
            set.evaluate(&Context::from(&high), &data).unwrap(),
            EvaluationResult::Inactive
        );
    }

    #[test]
    fn test_anonymous_has_no_attributes() {
        let set = set();
        let anonymous = Principal::Anonymous;
        let data = conditions(&[
            ("percent", Value::Integer(100)),
            ("username", Value::from("alice")),
            ("is_staff", Value::Bool(true)),
        ]);
        assert_eq!(
            set.evaluate(&Context::from(&anonymous), &data).unwrap(),
            EvaluationResult::Abstain
        );
    }

    #[test]
    fn test_is_active_for_anonymous_follows_is_anonymous() {
        let set = set();
        let anonymous = Principal::Anonymous;

        let only_active = conditions(&[("is_active", Value::Bool(true))]);
        assert_eq!(
            set.evaluate(&Context::from(&anonymous), &only_active).unwrap(),
            EvaluationResult::Abstain
        );

        let both = conditions(&[
            ("is_active", Value::Bool(true)),
            ("is_anonymous", Value::Bool(false)),
        ]);
        assert_eq!(
            set.evaluate(&Context::from(&anonymous), &both).unwrap(),
            EvaluationResult::Inactive
        );
    }

    #[test]
    fn test_anonymous_conditions_accept_lists() {
        let set = set();
        let anonymous = Principal::Anonymous;
        let context = Context::from(&anonymous);

        for with_active in [false, true] {
            for (flag, expected) in [
                (true, EvaluationResult::Active),
                (false, EvaluationResult::Inactive),
            ] {
                let mut data = conditions(&[("is_anonymous", Value::from(vec![flag]))]);
                if with_active {
                    data.insert("is_active".to_string(), Value::Bool(true));
                }
                assert_eq!(set.evaluate(&context, &data).unwrap(), expected);
            }
        }

        // is_active reads the listed is_anonymous value for anonymous visitors
        let data = conditions(&[
            ("is_anonymous", Value::from(vec![false, true])),
            ("is_active", Value::Bool(true)),
        ]);
        let (result, traces) = set.evaluate_traced(&context, &data).unwrap();
        assert_eq!(result, EvaluationResult::Active);
        assert_eq!(traces.len(), 1);

        let users_only = conditions(&[
            ("is_anonymous", Value::from(vec![false])),
            ("is_active", Value::Bool(true)),
        ]);
        let (_, traces) = set.evaluate_traced(&context, &users_only).unwrap();
        let is_active = traces.iter().find(|t| t.field == "is_active").unwrap();
        assert_eq!(is_active.result, EvaluationResult::Inactive);

        let user = Principal::from(User::new(1, "alice"));
        let listed = conditions(&[("is_anonymous", Value::from(vec![true]))]);
        assert_eq!(
            set.evaluate(&Context::from(&user), &listed).unwrap(),
            EvaluationResult::Abstain
        );
    }

    #[test]
    fn test_is_active_for_users_compares_flag() {
        let set = set();
        let data = conditions(&[("is_active", Value::Bool(true))]);

        let active = Principal::from(User::new(1, "alice"));
        let inactive = Principal::from(User::new(2, "bob").with_active(false));
        assert_eq!(
            set.evaluate(&Context::from(&active), &data).unwrap(),
            EvaluationResult::Active
        );
        assert_eq!(
            set.evaluate(&Context::from(&inactive), &data).unwrap(),
            EvaluationResult::Inactive
        );
    }

    #[test]
    fn test_group_membership() {
        let set = set();
        let data = conditions(&[("is_member_of_group", Value::from(vec!["beta", "gamma"]))]);

        let beta = Principal::from(User::new(1, "alice").with_group("beta"));
        let delta = Principal::from(User::new(2, "bob").with_group("delta"));
        assert_eq!(
            set.evaluate(&Context::from(&beta), &data).unwrap(),
            EvaluationResult::Active
        );
        assert_eq!(
            set.evaluate(&Context::from(&delta), &data).unwrap(),
            EvaluationResult::Inactive
        );
        assert_eq!(
            set.evaluate(&Context::from(&Principal::Anonymous), &data)
                .unwrap(),
            EvaluationResult::Abstain
        );
    }
}
