//! The `ip` condition set: the request's remote address

use crate::collaborators::InternalIps;
use std::net::IpAddr;
use std::sync::Arc;
use switchboard_core::{
    ConditionSet, Context, ContextKind, CoreError, Field, FieldAccessor, Result, Value,
    PERCENT_BUCKETS,
};

/// Deterministic bucket key for an address.
///
/// IPv4 addresses sum their octets; IPv6 addresses fold the high and low 64
/// bits together with XOR.
pub fn ip_bucket_key(addr: &str) -> Result<u64> {
    let ip: IpAddr = addr
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidAddress(addr.to_string()))?;

    Ok(match ip {
        IpAddr::V4(v4) => v4.octets().iter().map(|&octet| u64::from(octet)).sum(),
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            ((bits >> 64) as u64) ^ (bits as u64)
        }
    })
}

struct IpAccessor {
    internal_ips: Arc<dyn InternalIps>,
}

impl FieldAccessor for IpAccessor {
    fn get_field_value(&self, context: &Context<'_>, field: &str) -> Result<Option<Value>> {
        let addr = match context.request().and_then(|request| request.remote_addr()) {
            Some(addr) => addr.trim(),
            None => return Ok(None),
        };

        let value = match field {
            "percent" => {
                // reduced here so the key always fits the percent comparison
                let key = ip_bucket_key(addr)? % PERCENT_BUCKETS as u64;
                Value::Integer(key as i64)
            }
            "ip_address" => Value::String(addr.to_string()),
            "internal_ip" => Value::Bool(self.internal_ips.is_internal(addr)),
            other => return Ok(context.lookup(other)),
        };
        Ok(Some(value))
    }
}

/// Build the `ip` set
pub fn ip_condition_set(internal_ips: Arc<dyn InternalIps>) -> ConditionSet {
    ConditionSet::builder("ip")
        .group_label("IP Address")
        .applies_to(ContextKind::Request)
        .accessor(IpAccessor { internal_ips })
        .field(Field::percent("percent"))
        .field(Field::ip_address("ip_address").with_label("IP Address"))
        .field(Field::boolean("internal_ip").with_label("Internal IPs"))
        .build()
}
