//! Integration tests for the built-in condition sets and their collaborators

mod common;

use common::{request_from, switch, TestEngine, TEST_HOSTNAME};
use std::collections::HashSet;
use switchboard_sdk::{
    ip_bucket_key, ConditionIssue, ConditionSet, Context, ContextKind, Field, GroupResolver,
    InternalIps, Principal, RequestMetadata, SdkError, SwitchEngine, User,
};

// ============================================================================
// IP bucketing
// ============================================================================

#[test]
fn test_ip_bucket_keys() {
    assert_eq!(ip_bucket_key("1.2.3.4").unwrap(), 10);
    assert_eq!(ip_bucket_key("0.0.0.0").unwrap(), 0);
    assert_eq!(ip_bucket_key("192.168.1.1").unwrap(), 362);
    assert!(ip_bucket_key("not-an-ip").is_err());
}

#[test]
fn test_ipv6_bucket_key_is_stable() {
    let first = ip_bucket_key("2001:db8::1").unwrap();
    let second = ip_bucket_key("2001:0db8:0000:0000:0000:0000:0000:0001").unwrap();
    assert_eq!(first, second);
    assert_eq!(first, 0x2001_0db8_0000_0000 ^ 1);
}

#[test]
fn test_ip_percent_rollout() {
    let engine = TestEngine::new().build();
    let rollout = switch(
        r#"
key: ip_rollout
conditions:
  ip:
    percent: 11
"#,
    );

    // 1.2.3.4 lands in bucket 10, 1.2.3.5 in bucket 11
    let inside = request_from("1.2.3.4");
    let outside = request_from("1.2.3.5");
    assert!(engine.is_active(&rollout, &[Context::from(&inside)]).unwrap());
    assert!(!engine.is_active(&rollout, &[Context::from(&outside)]).unwrap());

    // no remote address: abstain, default off
    let bare = RequestMetadata::new();
    assert!(!engine.is_active(&rollout, &[Context::from(&bare)]).unwrap());
}

// ============================================================================
// Custom collaborators
// ============================================================================

struct DirectoryGroups {
    admins: HashSet<i64>,
}

impl GroupResolver for DirectoryGroups {
    fn is_member(&self, user: &User, group: &str) -> bool {
        group == "admins" && self.admins.contains(&user.id)
    }
}

struct PrivateRanges;

impl InternalIps for PrivateRanges {
    fn is_internal(&self, addr: &str) -> bool {
        addr.starts_with("10.") || addr.starts_with("192.168.")
    }
}

#[test]
fn test_custom_collaborators() {
    let engine = SwitchEngine::builder()
        .with_hostname(TEST_HOSTNAME)
        .with_group_resolver(DirectoryGroups {
            admins: HashSet::from([7]),
        })
        .with_internal_ips(PrivateRanges)
        .build()
        .unwrap();

    let admin_only = switch(
        r#"
key: admin_only
conditions:
  auth:
    is_member_of_group: admins
"#,
    );
    let admin = Principal::from(User::new(7, "root"));
    let other = Principal::from(User::new(8, "alice").with_group("admins"));
    assert!(engine.is_active(&admin_only, &[Context::from(&admin)]).unwrap());
    assert!(!engine.is_active(&admin_only, &[Context::from(&other)]).unwrap());

    let office = switch(
        r#"
key: office
conditions:
  ip:
    internal_ip: true
"#,
    );
    let lan = request_from("192.168.4.20");
    assert!(engine.is_active(&office, &[Context::from(&lan)]).unwrap());
}

#[test]
fn test_application_condition_set() {
    let engine = SwitchEngine::builder()
        .with_hostname(TEST_HOSTNAME)
        .register(
            ConditionSet::builder("tenant")
                .group_label("Tenant")
                .applies_to(ContextKind::Request)
                .field(Field::string("HTTP_X_TENANT").with_label("Tenant"))
                .build(),
        )
        .build()
        .unwrap();

    let acme_only = switch(
        r#"
key: acme_only
conditions:
  tenant:
    HTTP_X_TENANT: acme
"#,
    );
    let acme = RequestMetadata::new().with("HTTP_X_TENANT", "acme");
    let globex = RequestMetadata::new().with("HTTP_X_TENANT", "globex");
    assert!(engine.is_active(&acme_only, &[Context::from(&acme)]).unwrap());
    assert!(!engine.is_active(&acme_only, &[Context::from(&globex)]).unwrap());

    let namespaces: Vec<_> = engine
        .condition_sets()
        .into_iter()
        .map(|set| set.namespace)
        .collect();
    assert_eq!(namespaces, vec!["auth", "ip", "host", "tenant"]);
}

// ============================================================================
// Authoring-time validation
// ============================================================================

#[test]
fn test_validate_reports_problems() {
    let engine = TestEngine::new().build();
    let broken = switch(
        r#"
key: broken
conditions:
  auth:
    date_joined: sometime
  ip:
    ip_address: [10.0.0.1, 10.0.0.256]
  region:
    country: NZ
"#,
    );

    let issues = engine.validate(&broken);
    assert_eq!(issues.len(), 3);
    assert!(issues.contains(&ConditionIssue::UnknownNamespace("region".to_string())));

    let err = engine.clean(&broken).unwrap_err();
    match err {
        SdkError::InvalidSwitch { key, issues } => {
            assert_eq!(key, "broken");
            assert_eq!(issues.len(), 3);
        }
        other => panic!("Expected InvalidSwitch, got {:?}", other),
    }
}

#[test]
fn test_evaluation_rejects_malformed_condition() {
    let engine = TestEngine::new().build();
    let broken = switch(
        r#"
key: broken
conditions:
  auth:
    percent: 250
"#,
    );
    let principal = Principal::from(User::new(1, "alice"));
    let err = engine
        .is_active(&broken, &[Context::from(&principal)])
        .unwrap_err();
    assert!(matches!(err, SdkError::Core(_)));
}

#[test]
fn test_listed_anonymous_condition_validates_and_evaluates() {
    let engine = TestEngine::new().build();
    let signup = switch(
        r#"
key: signup
conditions:
  auth:
    is_anonymous: [true]
"#,
    );
    assert!(engine.validate(&signup).is_empty());

    let visitor = Principal::Anonymous;
    let member = Principal::from(User::new(1, "alice"));
    assert!(engine.is_active(&signup, &[Context::from(&visitor)]).unwrap());
    assert!(!engine.is_active(&signup, &[Context::from(&member)]).unwrap());

    let users_only = switch(
        r#"
key: users_only
conditions:
  auth:
    is_anonymous: [false]
    is_active: true
"#,
    );
    assert!(engine.validate(&users_only).is_empty());
    assert!(!engine.is_active(&users_only, &[Context::from(&visitor)]).unwrap());
    assert!(engine.is_active(&users_only, &[Context::from(&member)]).unwrap());
}

#[test]
fn test_malformed_condition_rejected_for_every_context() {
    let engine = TestEngine::new().build();
    let broken = switch(
        r#"
key: broken
conditions:
  auth:
    username: alice
    is_staff: maybe
"#,
    );
    let alice = Principal::from(User::new(1, "alice"));
    let bob = Principal::from(User::new(2, "bob"));
    for principal in [&alice, &bob] {
        let err = engine
            .is_active(&broken, &[Context::from(principal)])
            .unwrap_err();
        assert!(matches!(err, SdkError::Core(_)));
    }
}
