//! In-memory implementations of the collaborator traits
//!
//! [`MemoryStore`] is a dashmap-backed [`DirectoryStore`] with the same
//! observable semantics as the managed document store: bounded membership
//! queries, stable-key pagination and all-or-nothing batch commits. It backs
//! embedded use and every test in the workspace.
//!
//! [`StaticVerifier`] is a registry-backed [`TokenVerifier`]: claims written
//! through `set_claims` stay pending until the credential is refreshed,
//! reproducing the staleness window of the real identity provider.

use casillero_core::error::{Error, Result};
use casillero_core::limits::IN_QUERY_LIMIT;
use casillero_core::traits::{DirectoryStore, TokenVerifier, WriteOp};
use casillero_core::types::{
    Claims, Identity, IdentityId, ProfileRecord, TenantId, TenantRecord, TrackingId,
    TrackingRecord,
};
use dashmap::DashMap;

/// Dashmap-backed document store
#[derive(Default)]
pub struct MemoryStore {
    profiles: DashMap<IdentityId, ProfileRecord>,
    tenants: DashMap<TenantId, TenantRecord>,
    trackings: DashMap<TrackingId, TrackingRecord>,
    counters: DashMap<String, u64>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile record
    pub fn put_profile(&self, id: impl Into<IdentityId>, record: ProfileRecord) {
        self.profiles.insert(id.into(), record);
    }

    /// Insert or replace a tenant record
    pub fn put_tenant(&self, id: impl Into<TenantId>, record: TenantRecord) {
        self.tenants.insert(id.into(), record);
    }

    /// Insert or replace a tracking record
    pub fn put_tracking(&self, id: impl Into<TrackingId>, record: TrackingRecord) {
        self.trackings.insert(id.into(), record);
    }

    /// Snapshot of a tracking record, if present
    pub fn tracking(&self, id: &TrackingId) -> Option<TrackingRecord> {
        self.trackings.get(id).map(|r| r.clone())
    }

    fn apply(&self, op: WriteOp) {
        match op {
            WriteOp::SetTrackingTokens { id, tokens, .. } => {
                if let Some(mut record) = self.trackings.get_mut(&id) {
                    record.tracking_tokens = Some(tokens);
                }
            }
            WriteOp::SetClientTokens { id, tokens } => {
                if let Some(mut record) = self.tenants.get_mut(&id) {
                    record.client_tokens = Some(tokens);
                }
            }
            WriteOp::SetManagedTenants { id, tenant_ids } => {
                let mut record = self.profiles.entry(id).or_default();
                record.managed_tenant_ids = tenant_ids;
            }
            WriteOp::SetTenantCode { id, code } => {
                if let Some(mut record) = self.tenants.get_mut(&id) {
                    record.code = Some(code);
                }
            }
        }
    }

    // Commit validation: every targeted document must exist, checked before
    // anything is applied so a failed batch leaves the store untouched.
    fn validate(&self, op: &WriteOp) -> Result<()> {
        let missing = match op {
            WriteOp::SetTrackingTokens { id, .. } => {
                (!self.trackings.contains_key(id)).then(|| format!("tracking {id}"))
            }
            WriteOp::SetClientTokens { id, .. } | WriteOp::SetTenantCode { id, .. } => {
                (!self.tenants.contains_key(id)).then(|| format!("tenant {id}"))
            }
            // Profiles are upserted: the sync operation may run before the
            // identity ever signed in.
            WriteOp::SetManagedTenants { .. } => None,
        };
        match missing {
            Some(target) => Err(Error::Store(format!("commit targets unknown {target}"))),
            None => Ok(()),
        }
    }
}

impl DirectoryStore for MemoryStore {
    fn profile(&self, id: &IdentityId) -> Result<Option<ProfileRecord>> {
        Ok(self.profiles.get(id).map(|r| r.clone()))
    }

    fn tenant(&self, id: &TenantId) -> Result<Option<TenantRecord>> {
        Ok(self.tenants.get(id).map(|r| r.clone()))
    }

    fn tenant_by_code(&self, code: &str) -> Result<Option<(TenantId, TenantRecord)>> {
        Ok(self
            .tenants
            .iter()
            .find(|entry| entry.value().code.as_deref() == Some(code))
            .map(|entry| (entry.key().clone(), entry.value().clone())))
    }

    fn tenants_managed_by(&self, manager: &IdentityId) -> Result<Vec<(TenantId, TenantRecord)>> {
        let mut out: Vec<_> = self
            .tenants
            .iter()
            .filter(|entry| entry.value().manager_id.as_ref() == Some(manager))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn tenants_by_ids(&self, ids: &[TenantId]) -> Result<Vec<(TenantId, TenantRecord)>> {
        if ids.len() > IN_QUERY_LIMIT {
            return Err(Error::InvalidOperation(format!(
                "membership query over {} ids exceeds the limit of {IN_QUERY_LIMIT}",
                ids.len()
            )));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.tenants.get(id).map(|r| (id.clone(), r.clone())))
            .collect())
    }

    fn tenants_with_token(&self, token: &str) -> Result<Vec<(TenantId, TenantRecord)>> {
        let mut out: Vec<_> = self
            .tenants
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .client_tokens
                    .as_ref()
                    .is_some_and(|tokens| tokens.contains(token))
            })
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn trackings_for_tenant(&self, tenant: &TenantId) -> Result<Vec<(TrackingId, TrackingRecord)>> {
        let mut out: Vec<_> = self
            .trackings
            .iter()
            .filter(|entry| entry.value().tenant_id.as_ref() == Some(tenant))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn trackings_with_token(&self, token: &str) -> Result<Vec<(TrackingId, TrackingRecord)>> {
        let mut out: Vec<_> = self
            .trackings
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .tracking_tokens
                    .as_ref()
                    .is_some_and(|tokens| tokens.contains(token))
            })
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn trackings_after(
        &self,
        cursor: Option<&TrackingId>,
        limit: usize,
    ) -> Result<Vec<(TrackingId, TrackingRecord)>> {
        let mut out: Vec<_> = self
            .trackings
            .iter()
            .filter(|entry| cursor.map_or(true, |c| entry.key() > c))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out.truncate(limit);
        Ok(out)
    }

    fn tenants_after(
        &self,
        cursor: Option<&TenantId>,
        limit: usize,
    ) -> Result<Vec<(TenantId, TenantRecord)>> {
        let mut out: Vec<_> = self
            .tenants
            .iter()
            .filter(|entry| cursor.map_or(true, |c| entry.key() > c))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out.truncate(limit);
        Ok(out)
    }

    fn next_counter(&self, name: &str) -> Result<u64> {
        let mut entry = self.counters.entry(name.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    fn commit(&self, batch: Vec<WriteOp>) -> Result<()> {
        for op in &batch {
            self.validate(op)?;
        }
        for op in batch {
            self.apply(op);
        }
        Ok(())
    }
}

/// Registry-backed token verifier with a claims staleness window
#[derive(Default)]
pub struct StaticVerifier {
    identities: DashMap<String, Identity>,
    pending: DashMap<IdentityId, Claims>,
}

impl StaticVerifier {
    /// Create an empty verifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bearer credential for an identity
    pub fn register(&self, bearer: impl Into<String>, identity: Identity) {
        self.identities.insert(bearer.into(), identity);
    }

    /// Refresh a credential: pending claims become effective.
    ///
    /// Mirrors the provider's behavior where `set_claims` only lands on the
    /// next token refresh.
    pub fn refresh(&self, bearer: &str) -> Result<()> {
        let mut identity = self
            .identities
            .get_mut(bearer)
            .ok_or_else(|| Error::Credential(format!("unknown bearer credential {bearer}")))?;
        if let Some((_, claims)) = self.pending.remove(&identity.id) {
            identity.claims = claims;
        }
        Ok(())
    }
}

impl TokenVerifier for StaticVerifier {
    fn verify(&self, bearer: &str) -> Result<Identity> {
        self.identities
            .get(bearer)
            .map(|i| i.clone())
            .ok_or_else(|| Error::Credential(format!("unknown bearer credential {bearer}")))
    }

    fn set_claims(&self, id: &IdentityId, claims: &Claims) -> Result<()> {
        self.pending.insert(id.clone(), claims.clone());
        Ok(())
    }
}
