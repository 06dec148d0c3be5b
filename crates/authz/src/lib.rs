//! Role/scope resolution and tenant authorization for casillero
//!
//! This crate provides:
//! - [`ScopeResolver`]: the one place where credential claims and the profile
//!   record are reconciled into an effective role and tenant scope
//! - the authorization gate: pure allow/deny decisions plus the query filter
//!   a caller's reads must apply
//!
//! The resolver fails closed: a profile read error yields a terminal Failed
//! state for the credential, never a claim-only fallback.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod resolver;

// Re-export commonly used items
pub use gate::{can_access_tenant, require_role, scope_filter, ScopeFilter};
pub use resolver::{resolve_role, Resolved, ScopeResolver};
