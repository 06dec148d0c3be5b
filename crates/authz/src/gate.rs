//! Authorization gate: pure allow/deny decisions over a resolved scope
//!
//! All functions here are decision-only; the caller translates a deny into an
//! HTTP 401/403 or a redirect at the boundary. An unresolved role or an empty
//! scope always denies — never an empty-but-successful result.

use crate::resolver::Resolved;
use casillero_core::error::{Error, Result};
use casillero_core::types::{Role, TenantId};
use std::collections::BTreeSet;

/// The query filter a caller's listing and search operations must apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Administrative tier: no tenant filter
    Unrestricted,
    /// Restrict every read to these tenants; never empty
    Tenants(BTreeSet<TenantId>),
}

impl ScopeFilter {
    /// Whether a tenant passes this filter
    pub fn allows(&self, tenant: &TenantId) -> bool {
        match self {
            ScopeFilter::Unrestricted => true,
            ScopeFilter::Tenants(set) => set.contains(tenant),
        }
    }
}

/// True iff the caller may access the tenant.
///
/// Membership in the resolved scope, or the administrative-tier bypass
/// (superadmin/admin/operator ignore the scope entirely — a privilege tier,
/// not a scope of one). No role means no access.
pub fn can_access_tenant(resolved: &Resolved, tenant: &TenantId) -> bool {
    match resolved.role {
        Some(role) if role.is_admin_tier() => true,
        Some(_) => resolved.scope.contains(tenant),
        None => false,
    }
}

/// True iff the resolved role is one of `allowed`
pub fn require_role(resolved: &Resolved, allowed: &[Role]) -> bool {
    match resolved.role {
        Some(role) => allowed.contains(&role),
        None => false,
    }
}

/// The filter to apply to listings and searches for this caller.
///
/// # Errors
///
/// Returns `AccessDenied` when the role is unresolved or the scope is empty,
/// so a denial stays distinguishable from a query that found nothing.
pub fn scope_filter(resolved: &Resolved) -> Result<ScopeFilter> {
    match resolved.role {
        Some(role) if role.is_admin_tier() => Ok(ScopeFilter::Unrestricted),
        Some(_) if !resolved.scope.is_empty() => Ok(ScopeFilter::Tenants(resolved.scope.clone())),
        Some(role) => Err(Error::AccessDenied(format!(
            "role {role} has no tenants in scope"
        ))),
        None => Err(Error::AccessDenied("unresolved role".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casillero_core::types::IdentityId;

    fn resolved(role: Option<Role>, scope: &[&str]) -> Resolved {
        Resolved {
            identity: IdentityId::from("u1"),
            role,
            scope: scope.iter().map(|t| TenantId::from(*t)).collect(),
        }
    }

    #[test]
    fn test_admin_tier_bypasses_scope() {
        for role in [Role::Superadmin, Role::Admin, Role::Operator] {
            let r = resolved(Some(role), &[]);
            assert!(can_access_tenant(&r, &TenantId::from("anything")));
        }
    }

    #[test]
    fn test_member_allowed_nonmember_denied() {
        let r = resolved(Some(Role::Partner), &["t1", "t2"]);
        assert!(can_access_tenant(&r, &TenantId::from("t1")));
        assert!(!can_access_tenant(&r, &TenantId::from("t3")));
    }

    #[test]
    fn test_no_role_denies_everything() {
        let r = resolved(None, &["t1"]);
        assert!(!can_access_tenant(&r, &TenantId::from("t1")));
    }

    #[test]
    fn test_require_role() {
        let r = resolved(Some(Role::Partner), &[]);
        assert!(require_role(&r, &[Role::Partner, Role::PartnerAdmin]));
        assert!(!require_role(&r, &[Role::Admin]));
        assert!(!require_role(&resolved(None, &[]), &[Role::Client]));
    }

    #[test]
    fn test_scope_filter_unrestricted_for_admin_tier() {
        let r = resolved(Some(Role::Admin), &[]);
        assert_eq!(scope_filter(&r).unwrap(), ScopeFilter::Unrestricted);
    }

    #[test]
    fn test_scope_filter_tenants_for_scoped_roles() {
        let r = resolved(Some(Role::Client), &["t1"]);
        match scope_filter(&r).unwrap() {
            ScopeFilter::Tenants(set) => assert!(set.contains(&TenantId::from("t1"))),
            other => panic!("expected tenant filter, got {other:?}"),
        }
    }

    #[test]
    fn test_scope_filter_denies_empty_scope() {
        let r = resolved(Some(Role::Client), &[]);
        assert!(matches!(scope_filter(&r), Err(Error::AccessDenied(_))));
    }

    #[test]
    fn test_scope_filter_denies_unresolved_role() {
        let r = resolved(None, &["t1"]);
        assert!(matches!(scope_filter(&r), Err(Error::AccessDenied(_))));
    }

    #[test]
    fn test_filter_allows() {
        assert!(ScopeFilter::Unrestricted.allows(&TenantId::from("t1")));
        let filter = ScopeFilter::Tenants([TenantId::from("t1")].into());
        assert!(filter.allows(&TenantId::from("t1")));
        assert!(!filter.allows(&TenantId::from("t2")));
    }
}
