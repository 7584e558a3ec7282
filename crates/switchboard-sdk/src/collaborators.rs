//! External collaborators consumed by the built-in condition sets
//!
//! The engine never looks up group membership, settings or the host name
//! itself. Applications plug their own sources in through these traits; the
//! defaults here cover the common in-process cases.

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use switchboard_core::User;

/// Answers whether a user belongs to a group
pub trait GroupResolver: Send + Sync {
    fn is_member(&self, user: &User, group: &str) -> bool;
}

/// Membership taken from [`User::groups`]
#[derive(Debug, Default, Clone, Copy)]
pub struct UserGroups;

impl GroupResolver for UserGroups {
    fn is_member(&self, user: &User, group: &str) -> bool {
        user.groups.iter().any(|g| g == group)
    }
}

/// The configured list of internal network addresses
pub trait InternalIps: Send + Sync {
    fn is_internal(&self, addr: &str) -> bool;
}

/// Fixed set of internal addresses
#[derive(Debug, Default, Clone)]
pub struct StaticInternalIps {
    addrs: HashSet<IpAddr>,
}

impl StaticInternalIps {
    pub fn new(addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            addrs: addrs.into_iter().collect(),
        }
    }

    /// Parse textual addresses, reporting the first one that is not an IP
    pub fn parse<I, S>(addrs: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = HashSet::new();
        for addr in addrs {
            let addr = addr.as_ref().trim();
            let ip = addr
                .parse::<IpAddr>()
                .map_err(|_| format!("{:?} is not an IP address", addr))?;
            parsed.insert(ip);
        }
        Ok(Self { addrs: parsed })
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

impl InternalIps for StaticInternalIps {
    fn is_internal(&self, addr: &str) -> bool {
        addr.trim()
            .parse::<IpAddr>()
            .map(|ip| self.addrs.contains(&ip))
            .unwrap_or(false)
    }
}

/// Name of the machine the engine runs on
pub trait HostnameSource: Send + Sync {
    fn hostname(&self) -> Option<String>;
}

/// Host name reported by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostname;

impl HostnameSource for SystemHostname {
    fn hostname(&self) -> Option<String> {
        gethostname::gethostname().into_string().ok()
    }
}

/// A host name fixed at configuration time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHostname(pub String);

impl FixedHostname {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl HostnameSource for FixedHostname {
    fn hostname(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl fmt::Display for FixedHostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
