//! Evaluation contexts
//!
//! A switch is evaluated against one of three context shapes: a principal
//! (authenticated user or anonymous visitor), the metadata of an incoming
//! request, or no object at all. `Context` borrows the caller's data for the
//! duration of a single evaluation.

mod principal;
mod request;

pub use principal::{Principal, User};
pub use request::RequestMetadata;

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute lookup on a context payload.
///
/// Returns `None` when the attribute does not exist for this payload, which
/// the evaluator treats as "no opinion" rather than a failed match.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<Value>;
}

/// Tag of a [`Context`] variant, used by condition-set applicability checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Principal,
    Request,
    None,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Principal => write!(f, "principal"),
            ContextKind::Request => write!(f, "request"),
            ContextKind::None => write!(f, "none"),
        }
    }
}

/// The object a switch is evaluated against
#[derive(Debug, Clone, Copy)]
pub enum Context<'a> {
    /// A user or anonymous visitor
    Principal(&'a Principal),
    /// Request metadata (remote address and friends)
    Request(&'a RequestMetadata),
    /// No object; host-level conditions only
    None,
}

impl<'a> Context<'a> {
    pub fn kind(&self) -> ContextKind {
        match self {
            Context::Principal(_) => ContextKind::Principal,
            Context::Request(_) => ContextKind::Request,
            Context::None => ContextKind::None,
        }
    }

    /// Default attribute lookup by field name
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Context::Principal(principal) => principal.field(name),
            Context::Request(request) => request.field(name),
            Context::None => None,
        }
    }

    pub fn principal(&self) -> Option<&'a Principal> {
        match self {
            Context::Principal(principal) => Some(principal),
            _ => None,
        }
    }

    /// Authenticated user, if this is a principal context for one
    pub fn user(&self) -> Option<&'a User> {
        self.principal().and_then(Principal::user)
    }

    pub fn request(&self) -> Option<&'a RequestMetadata> {
        match self {
            Context::Request(request) => Some(request),
            _ => None,
        }
    }
}

impl<'a> From<&'a Principal> for Context<'a> {
    fn from(principal: &'a Principal) -> Self {
        Context::Principal(principal)
    }
}

impl<'a> From<&'a RequestMetadata> for Context<'a> {
    fn from(request: &'a RequestMetadata) -> Self {
        Context::Request(request)
    }
}
