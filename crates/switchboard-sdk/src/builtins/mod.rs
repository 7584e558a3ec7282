//! Built-in condition sets
//!
//! | namespace | context   | fields |
//! |-----------|-----------|--------|
//! | `auth`    | principal | percent, username, email, is_anonymous, is_active, is_staff, is_superuser, date_joined, is_member_of_group |
//! | `ip`      | request   | percent, ip_address, internal_ip |
//! | `host`    | none      | hostname |

mod host;
mod ip;
mod user;

pub use host::host_condition_set;
pub use ip::{ip_bucket_key, ip_condition_set};
pub use user::user_condition_set;

use crate::collaborators::{GroupResolver, HostnameSource, InternalIps};
use std::sync::Arc;
use switchboard_core::{ConditionRegistry, Result};

/// Register the `auth`, `ip` and `host` sets, in that order
pub fn register_builtins(
    registry: &mut ConditionRegistry,
    groups: Arc<dyn GroupResolver>,
    internal_ips: Arc<dyn InternalIps>,
    hostname: Arc<dyn HostnameSource>,
) -> Result<()> {
    registry.register(user_condition_set(groups))?;
    registry.register(ip_condition_set(internal_ips))?;
    registry.register(host_condition_set(hostname))?;
    tracing::debug!("Registered built-in condition sets");
    Ok(())
}
