//! Scope resolution: reconciling claims with the profile record
//!
//! A caller carries two independently-sourced privilege signals: the claims
//! baked into its signed credential (refreshable, possibly stale) and the
//! mutable profile record keyed by the same identity (immediately
//! consistent). This module owns the one precedence rule that reconciles
//! them, plus the scope computation that turns an identity into the set of
//! tenants it may touch.
//!
//! Resolution is a small state machine per credential:
//!
//! ```text
//! Unresolved ──resolve()──▶ Resolving ──┬──▶ Resolved { role, scope }
//!                                       └──▶ Failed  (profile read error)
//! ```
//!
//! `Resolved` and `Failed` are terminal for the current credential and are
//! memoized; a new credential or an explicit [`ScopeResolver::invalidate`]
//! restarts at `Unresolved`. There is no persisted state: resolution is
//! read-only and idempotent, so concurrent requests need no coordination.

use casillero_core::error::{Error, Result};
use casillero_core::traits::{DirectoryStore, WriteOp};
use casillero_core::types::{Claims, Identity, IdentityId, ProfileRecord, Role, TenantId};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a successful resolution: the effective role plus tenant scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The identity this resolution belongs to
    pub identity: IdentityId,
    /// Effective role after reconciling claims and profile; `None` when
    /// neither source carries a recognized role
    pub role: Option<Role>,
    /// Tenant IDs the identity may act upon
    pub scope: BTreeSet<TenantId>,
}

/// Terminal resolution state memoized per credential
#[derive(Debug, Clone)]
enum ResolutionState {
    Resolved(Resolved),
    Failed(String),
}

/// Reconcile the two role signals into the effective role.
///
/// Precedence, in order:
/// 1. The legacy superadmin boolean claim wins outright when set.
/// 2. A partner-tier profile role wins regardless of the claim: claims go
///    stale after a promotion and must never demote a current partner nor
///    elevate a non-partner.
/// 3. Otherwise the claim role, when it is a recognized value.
/// 4. Otherwise the profile role.
/// 5. Otherwise no role: callers default-deny.
pub fn resolve_role(claims: &Claims, profile: Option<&ProfileRecord>) -> Option<Role> {
    if claims.superadmin {
        return Some(Role::Superadmin);
    }
    let profile_role = profile.and_then(|p| p.role.as_deref()).and_then(Role::parse);
    if matches!(profile_role, Some(r) if r.is_partner_tier()) {
        return profile_role;
    }
    let claim_role = claims.role.as_deref().and_then(Role::parse);
    claim_role.or(profile_role)
}

/// Resolves and memoizes role/scope per credential.
///
/// Holds only an `Arc` to the store plus the memo cache; safe to share
/// across concurrent requests.
pub struct ScopeResolver<S> {
    store: Arc<S>,
    /// Credential key -> terminal state. Absent entry means `Unresolved`.
    cache: RwLock<HashMap<String, ResolutionState>>,
}

impl<S: DirectoryStore> ScopeResolver<S> {
    /// Create a resolver over the given store
    pub fn new(store: Arc<S>) -> Self {
        ScopeResolver {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve an identity's role and scope, memoized by credential key.
    ///
    /// The credential key is the opaque bearer string (or any value that
    /// changes when the credential does); both terminal states stick until
    /// the credential changes or is invalidated.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailed` when the profile read fails. The failure
    /// is terminal for the credential: role and scope stay undefined rather
    /// than falling back to "trust the claim alone".
    pub fn resolve(&self, credential_key: &str, identity: &Identity) -> Result<Resolved> {
        if let Some(state) = self.cache.read().get(credential_key) {
            return match state {
                ResolutionState::Resolved(resolved) => Ok(resolved.clone()),
                ResolutionState::Failed(reason) => Err(Error::ResolutionFailed(reason.clone())),
            };
        }

        // Unresolved -> Resolving. Concurrent callers may race here; the
        // computation is idempotent so last-writer-wins is fine.
        let outcome = self.resolve_uncached(identity);
        let state = match &outcome {
            Ok(resolved) => ResolutionState::Resolved(resolved.clone()),
            Err(err) => ResolutionState::Failed(err.to_string()),
        };
        self.cache
            .write()
            .insert(credential_key.to_string(), state);
        outcome
    }

    fn resolve_uncached(&self, identity: &Identity) -> Result<Resolved> {
        let profile = self.store.profile(&identity.id).map_err(|err| {
            warn!(identity = %identity.id, %err, "profile read failed, failing closed");
            Error::ResolutionFailed(err.to_string())
        })?;

        let role = resolve_role(&identity.claims, profile.as_ref());
        let scope = self.resolve_scope(&identity.id, profile.as_ref())?;
        debug!(
            identity = %identity.id,
            role = role.map(|r| r.as_str()).unwrap_or("none"),
            scope_len = scope.len(),
            "scope resolved"
        );

        Ok(Resolved {
            identity: identity.id.clone(),
            role,
            scope,
        })
    }

    /// The cached list on the profile wins when non-empty; otherwise fall
    /// back to the authoritative managed-by query. The fallback result is
    /// not cached back here — that is `sync_profile_scope`, an explicit
    /// separate operation.
    fn resolve_scope(
        &self,
        identity: &IdentityId,
        profile: Option<&ProfileRecord>,
    ) -> Result<BTreeSet<TenantId>> {
        if let Some(profile) = profile {
            if !profile.managed_tenant_ids.is_empty() {
                return Ok(profile.managed_tenant_ids.iter().cloned().collect());
            }
        }
        let managed = self.store.tenants_managed_by(identity).map_err(|err| {
            warn!(identity = %identity, %err, "managed-by query failed, failing closed");
            Error::ResolutionFailed(err.to_string())
        })?;
        Ok(managed.into_iter().map(|(id, _)| id).collect())
    }

    /// Drop the memoized state for one credential, restarting at Unresolved.
    ///
    /// Called after role or tenant-manager assignment changes so the next
    /// request re-reads the profile.
    pub fn invalidate(&self, credential_key: &str) {
        self.cache.write().remove(credential_key);
    }

    /// Drop all memoized state
    pub fn invalidate_all(&self) {
        self.cache.write().clear();
    }

    /// Recompute the managed-tenant list from the authoritative managerId
    /// relationship and write it back onto the profile record.
    ///
    /// This is the explicit cache sync deliberately kept out of resolution.
    /// Returns the list that was written.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query or the commit fails.
    pub fn sync_profile_scope(&self, identity: &IdentityId) -> Result<Vec<TenantId>> {
        let mut tenant_ids: Vec<TenantId> = self
            .store
            .tenants_managed_by(identity)?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        tenant_ids.sort();
        debug!(identity = %identity, count = tenant_ids.len(), "syncing managed-tenant cache");
        self.store.commit(vec![WriteOp::SetManagedTenants {
            id: identity.clone(),
            tenant_ids: tenant_ids.clone(),
        }])?;
        Ok(tenant_ids)
    }
}
