//! Feature rollout example
//!
//! This example demonstrates:
//! - Building a SwitchEngine from a YAML config
//! - Defining switches with group, percentage, address and host conditions
//! - Deciding switches for a few users and requests
//! - Printing the explanation behind each decision

use switchboard_sdk::{
    Context, EngineConfig, Principal, RequestMetadata, Switch, SwitchEngine, User,
};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
internal_ips:
  - 127.0.0.1
  - 10.0.0.5
hostname: web-1
default_combine: any
"#;

const SWITCHES: &str = r#"
- key: new_checkout
  label: New checkout
  conditions:
    auth:
      is_member_of_group: [beta, gamma]
      percent: 10
- key: admin_console
  label: Admin console
  combine: all
  conditions:
    auth:
      is_staff: true
    ip:
      internal_ip: true
- key: signup_banner
  label: Signup banner
  conditions:
    auth:
      is_anonymous: true
- key: canary_build
  label: Canary build
  conditions:
    host:
      hostname: [web-1, web-2]
- key: legacy_reports
  label: Legacy reports
  status:
    type: disabled
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("switchboard_core=info,switchboard_sdk=info")),
        )
        .init();

    println!("=== Feature Rollout Example ===\n");

    let engine = SwitchEngine::builder()
        .with_config(EngineConfig::from_yaml_str(CONFIG)?)
        .build()?;

    println!("Registered condition sets:");
    for set in engine.condition_sets() {
        let fields: Vec<_> = set.fields.iter().map(|f| f.label.as_str()).collect();
        println!("  {} ({}): {}", set.group_label, set.namespace, fields.join(", "));
    }
    println!();

    let switches: Vec<Switch> = serde_yaml::from_str(SWITCHES)?;
    for switch in &switches {
        let issues = engine.validate(switch);
        if !issues.is_empty() {
            println!("Switch {} has issues: {:?}", switch.key, issues);
        }
    }

    let beta_user = Principal::from(User::new(42, "alice").with_group("beta"));
    let staff_user = Principal::from(User::new(7, "root").with_staff(true));
    let visitor = Principal::Anonymous;
    let office = RequestMetadata::from_remote_addr("10.0.0.5");
    let cafe = RequestMetadata::from_remote_addr("203.0.113.9");

    let scenarios: Vec<(&str, Vec<Context<'_>>)> = vec![
        ("beta user from a cafe", vec![Context::from(&beta_user), Context::from(&cafe)]),
        ("staff in the office", vec![Context::from(&staff_user), Context::from(&office)]),
        ("staff from a cafe", vec![Context::from(&staff_user), Context::from(&cafe)]),
        ("anonymous visitor", vec![Context::from(&visitor), Context::from(&cafe)]),
    ];

    for (name, contexts) in &scenarios {
        println!("--- {} ---", name);
        for switch in &switches {
            let decision = engine.explain(switch, contexts)?;
            let voters: Vec<&str> = decision
                .trace
                .as_ref()
                .map(|trace| trace.active_namespaces().collect())
                .unwrap_or_default();
            println!(
                "  {:<16} {:<4} {}",
                switch.key,
                if decision.enabled { "on" } else { "off" },
                if voters.is_empty() {
                    String::new()
                } else {
                    format!("(active: {})", voters.join(", "))
                }
            );
        }
        println!();
    }

    let decision = engine.explain(&switches[1], &scenarios[2].1)?;
    println!("Full explanation for admin_console / staff from a cafe:");
    println!("{}", serde_json::to_string_pretty(&decision)?);

    Ok(())
}
