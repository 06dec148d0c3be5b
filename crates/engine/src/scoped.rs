//! Scope-bounded search and record access
//!
//! [`Directory`] is the orchestrator behind every authenticated read: it
//! verifies the bearer credential, resolves the caller's scope once, and
//! threads the resolved value through each operation as an explicit
//! parameter. Tenant scoping is always applied first, as a hard boundary;
//! token matching runs second, inside it. A token hit outside the permitted
//! tenant set is discarded, whatever the query matched.
//!
//! Like the resolver, the orchestrator is stateless beyond `Arc` handles;
//! concurrent requests share it freely.

use crate::lookup::lookup_chunked;
use casillero_authz::gate::{self, ScopeFilter};
use casillero_authz::resolver::{Resolved, ScopeResolver};
use casillero_core::error::Result;
use casillero_core::limits::{IN_QUERY_LIMIT, REINDEX_BATCH_SIZE};
use casillero_core::traits::{DirectoryStore, TokenVerifier};
use casillero_core::types::{TenantId, TenantRecord, TrackingId, TrackingRecord};
use casillero_search::planner::{plan, PlanMode};
use casillero_search::tokenizer::normalize;
use std::sync::Arc;
use tracing::debug;

/// Authenticated facade over the store: resolve once, then read within scope
pub struct Directory<S, V> {
    store: Arc<S>,
    verifier: Arc<V>,
    resolver: ScopeResolver<S>,
}

impl<S: DirectoryStore, V: TokenVerifier> Directory<S, V> {
    /// Create a directory over a store and an identity provider
    pub fn new(store: Arc<S>, verifier: Arc<V>) -> Self {
        Directory {
            resolver: ScopeResolver::new(Arc::clone(&store)),
            store,
            verifier,
        }
    }

    /// Verify a bearer credential and resolve its role and scope.
    ///
    /// The resolved value is memoized per credential; thread it through the
    /// request rather than re-authenticating per read.
    ///
    /// # Errors
    ///
    /// Returns `Credential` for an unverifiable bearer and
    /// `ResolutionFailed` when the profile read fails (fail closed).
    pub fn authenticate(&self, bearer: &str) -> Result<Resolved> {
        let identity = self.verifier.verify(bearer)?;
        self.resolver.resolve(bearer, &identity)
    }

    /// The underlying scope resolver (invalidation, explicit scope sync)
    pub fn resolver(&self) -> &ScopeResolver<S> {
        &self.resolver
    }

    /// The underlying store handle
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Point read of a tenant record, gated on the caller's scope.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when the tenant is outside the caller's scope;
    /// a permitted-but-missing tenant is `Ok(None)`, deliberately
    /// distinguishable from a denial.
    pub fn tenant_record(&self, caller: &Resolved, id: &TenantId) -> Result<Option<TenantRecord>> {
        if !gate::can_access_tenant(caller, id) {
            return Err(casillero_core::Error::AccessDenied(format!(
                "tenant {id} not in scope"
            )));
        }
        self.store.tenant(id)
    }

    /// All trackings of one tenant, gated on the caller's scope
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when the tenant is outside the caller's scope.
    pub fn tenant_trackings(
        &self,
        caller: &Resolved,
        id: &TenantId,
    ) -> Result<Vec<(TrackingId, TrackingRecord)>> {
        if !gate::can_access_tenant(caller, id) {
            return Err(casillero_core::Error::AccessDenied(format!(
                "tenant {id} not in scope"
            )));
        }
        self.store.trackings_for_tenant(id)
    }

    /// Search tracking records within the caller's scope.
    ///
    /// Empty input lists the scope; 1-2 character input filters that listing
    /// by substring containment; longer input goes through the token index
    /// and is then refined, so queries past the stored token length still
    /// match exactly.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for an unresolved role or empty scope, or a
    /// store error from the underlying queries.
    pub fn search_trackings(
        &self,
        caller: &Resolved,
        query: &str,
    ) -> Result<Vec<(TrackingId, TrackingRecord)>> {
        let filter = gate::scope_filter(caller)?;
        let planned = plan(query);
        debug!(mode = ?planned.mode, identity = %caller.identity, "tracking search");

        match planned.mode {
            PlanMode::None => self.scoped_trackings(&filter),
            PlanMode::ScopedSubstring => {
                let listing = self.scoped_trackings(&filter)?;
                Ok(listing
                    .into_iter()
                    .filter(|(_, r)| tracking_matches(r, &planned.normalized))
                    .collect())
            }
            PlanMode::GlobalToken => {
                let candidates = self.store.trackings_with_token(&planned.token())?;
                Ok(candidates
                    .into_iter()
                    .filter(|(_, r)| {
                        tracking_in_scope(r, &filter) && tracking_matches(r, &planned.normalized)
                    })
                    .collect())
            }
        }
    }

    /// Search tenant records within the caller's scope.
    ///
    /// Same plan selection as tracking search; the scope boundary here is
    /// the tenant's own ID.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for an unresolved role or empty scope, or a
    /// store error from the underlying queries.
    pub fn search_tenants(
        &self,
        caller: &Resolved,
        query: &str,
    ) -> Result<Vec<(TenantId, TenantRecord)>> {
        let filter = gate::scope_filter(caller)?;
        let planned = plan(query);
        debug!(mode = ?planned.mode, identity = %caller.identity, "tenant search");

        match planned.mode {
            PlanMode::None => self.scoped_tenants(&filter),
            PlanMode::ScopedSubstring => {
                let listing = self.scoped_tenants(&filter)?;
                Ok(listing
                    .into_iter()
                    .filter(|(_, r)| tenant_matches(r, &planned.normalized))
                    .collect())
            }
            PlanMode::GlobalToken => {
                let candidates = self.store.tenants_with_token(&planned.token())?;
                Ok(candidates
                    .into_iter()
                    .filter(|(id, r)| filter.allows(id) && tenant_matches(r, &planned.normalized))
                    .collect())
            }
        }
    }

    // Scope listing: per-tenant equality queries for a bounded scope, page
    // walking for the administrative tier.
    fn scoped_trackings(&self, filter: &ScopeFilter) -> Result<Vec<(TrackingId, TrackingRecord)>> {
        match filter {
            ScopeFilter::Unrestricted => {
                let mut out = Vec::new();
                let mut cursor: Option<TrackingId> = None;
                loop {
                    let page = self
                        .store
                        .trackings_after(cursor.as_ref(), REINDEX_BATCH_SIZE)?;
                    let exhausted = page.len() < REINDEX_BATCH_SIZE;
                    cursor = page.last().map(|(id, _)| id.clone());
                    out.extend(page);
                    if exhausted {
                        return Ok(out);
                    }
                }
            }
            ScopeFilter::Tenants(scope) => {
                let mut out = Vec::new();
                for tenant in scope {
                    out.extend(self.store.trackings_for_tenant(tenant)?);
                }
                Ok(out)
            }
        }
    }

    fn scoped_tenants(&self, filter: &ScopeFilter) -> Result<Vec<(TenantId, TenantRecord)>> {
        match filter {
            ScopeFilter::Unrestricted => {
                let mut out = Vec::new();
                let mut cursor: Option<TenantId> = None;
                loop {
                    let page = self.store.tenants_after(cursor.as_ref(), REINDEX_BATCH_SIZE)?;
                    let exhausted = page.len() < REINDEX_BATCH_SIZE;
                    cursor = page.last().map(|(id, _)| id.clone());
                    out.extend(page);
                    if exhausted {
                        return Ok(out);
                    }
                }
            }
            ScopeFilter::Tenants(scope) => {
                let ids: Vec<TenantId> = scope.iter().cloned().collect();
                lookup_chunked(&ids, IN_QUERY_LIMIT, |chunk| self.store.tenants_by_ids(chunk))
            }
        }
    }
}

// A tracking without an owner is only visible to the administrative tier.
fn tracking_in_scope(record: &TrackingRecord, filter: &ScopeFilter) -> bool {
    match (&record.tenant_id, filter) {
        (_, ScopeFilter::Unrestricted) => true,
        (Some(tenant), filter) => filter.allows(tenant),
        (None, ScopeFilter::Tenants(_)) => false,
    }
}

fn tracking_matches(record: &TrackingRecord, needle: &str) -> bool {
    normalize(&record.tracking).contains(needle)
}

// Containment per indexed dimension, mirroring the token builder: name per
// word, code whole, email local part only.
fn tenant_matches(record: &TenantRecord, needle: &str) -> bool {
    if let Some(name) = &record.name {
        if name.split_whitespace().any(|w| normalize(w).contains(needle)) {
            return true;
        }
    }
    if let Some(code) = &record.code {
        if normalize(code).contains(needle) {
            return true;
        }
    }
    if let Some(email) = &record.email {
        let local = email.split('@').next().unwrap_or_default();
        if normalize(local).contains(needle) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, StaticVerifier};
    use crate::reindex::Reindexer;
    use casillero_core::types::{Claims, Identity, ProfileRecord};

    /// Two tenants with disjoint managers, trackings indexed, three callers:
    /// a partner scoped to t1, a client scoped to t2, and an operator.
    fn fixture() -> Directory<MemoryStore, StaticVerifier> {
        let store = Arc::new(MemoryStore::new());

        store.put_tenant(
            "t1",
            TenantRecord {
                name: Some("María Pérez".to_string()),
                code: Some("CL00001".to_string()),
                email: Some("maria@gmail.com".to_string()),
                manager_id: Some("partner-1".into()),
                client_tokens: None,
            },
        );
        store.put_tenant(
            "t2",
            TenantRecord {
                name: Some("Acme Logistics".to_string()),
                code: Some("CL00002".to_string()),
                email: Some("ops@acme.io".to_string()),
                manager_id: Some("partner-2".into()),
                client_tokens: None,
            },
        );

        store.put_tracking(
            "p1",
            TrackingRecord {
                tracking: "1Z999AA1111".to_string(),
                tenant_id: Some("t1".into()),
                tracking_tokens: None,
            },
        );
        store.put_tracking(
            "p2",
            TrackingRecord {
                tracking: "1Z999BB2222".to_string(),
                tenant_id: Some("t2".into()),
                tracking_tokens: None,
            },
        );

        let reindexer = Reindexer::new(Arc::clone(&store));
        reindexer.trackings_full().unwrap();
        reindexer.tenants_full().unwrap();

        store.put_profile(
            "partner-1",
            ProfileRecord {
                role: Some("partner".to_string()),
                managed_tenant_ids: vec!["t1".into()],
            },
        );
        store.put_profile(
            "client-2",
            ProfileRecord {
                role: Some("client".to_string()),
                managed_tenant_ids: vec!["t2".into()],
            },
        );
        store.put_profile(
            "op-1",
            ProfileRecord {
                role: Some("operator".to_string()),
                managed_tenant_ids: vec![],
            },
        );

        let verifier = Arc::new(StaticVerifier::new());
        verifier.register("bearer-partner", Identity::new("partner-1", Claims::default()));
        verifier.register("bearer-client", Identity::new("client-2", Claims::default()));
        verifier.register("bearer-op", Identity::new("op-1", Claims::default()));
        verifier.register("bearer-nobody", Identity::new("ghost", Claims::default()));

        Directory::new(store, verifier)
    }

    #[test]
    fn test_empty_query_lists_scope() {
        let dir = fixture();
        let partner = dir.authenticate("bearer-partner").unwrap();
        let listing = dir.search_trackings(&partner, "").unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].0, TrackingId::from("p1"));
    }

    #[test]
    fn test_short_query_filters_scoped_listing() {
        let dir = fixture();
        let op = dir.authenticate("bearer-op").unwrap();
        // "bb" is below the token minimum: client-side containment only.
        let hits = dir.search_trackings(&op, "bb").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, TrackingId::from("p2"));
    }

    #[test]
    fn test_token_search_finds_substring() {
        let dir = fixture();
        let op = dir.authenticate("bearer-op").unwrap();
        let hits = dir.search_trackings(&op, "999aa").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, TrackingId::from("p1"));
    }

    #[test]
    fn test_long_query_refined_past_token_cap() {
        let dir = fixture();
        let op = dir.authenticate("bearer-op").unwrap();
        // 11 characters: the index lookup uses the clamped 8-char token and
        // containment refinement separates the two candidates.
        let hits = dir.search_trackings(&op, "1Z999BB2222").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, TrackingId::from("p2"));
    }

    #[test]
    fn test_token_search_never_leaks_across_tenants() {
        let dir = fixture();
        let partner = dir.authenticate("bearer-partner").unwrap();
        // The query matches t2's tracking tokens, but t2 is out of scope.
        let hits = dir.search_trackings(&partner, "999bb").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_tenant_search_scoped() {
        let dir = fixture();
        let partner = dir.authenticate("bearer-partner").unwrap();

        let hits = dir.search_tenants(&partner, "mar").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, TenantId::from("t1"));

        // Matches t2 only; out of scope for this partner.
        assert!(dir.search_tenants(&partner, "acme").unwrap().is_empty());

        let op = dir.authenticate("bearer-op").unwrap();
        assert_eq!(dir.search_tenants(&op, "acme").unwrap().len(), 1);
    }

    #[test]
    fn test_email_domain_never_matches() {
        let dir = fixture();
        let op = dir.authenticate("bearer-op").unwrap();
        assert!(dir.search_tenants(&op, "gmail").unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_caller_denied_not_empty() {
        let dir = fixture();
        let ghost = dir.authenticate("bearer-nobody").unwrap();
        assert!(ghost.role.is_none());
        let err = dir.search_trackings(&ghost, "999aa").unwrap_err();
        assert!(matches!(err, casillero_core::Error::AccessDenied(_)));
    }

    #[test]
    fn test_tenant_record_gated() {
        let dir = fixture();
        let client = dir.authenticate("bearer-client").unwrap();

        assert!(dir
            .tenant_record(&client, &TenantId::from("t2"))
            .unwrap()
            .is_some());
        let err = dir.tenant_record(&client, &TenantId::from("t1")).unwrap_err();
        assert!(matches!(err, casillero_core::Error::AccessDenied(_)));
    }

    #[test]
    fn test_tenant_trackings_gated() {
        let dir = fixture();
        let partner = dir.authenticate("bearer-partner").unwrap();
        let listing = dir.tenant_trackings(&partner, &TenantId::from("t1")).unwrap();
        assert_eq!(listing.len(), 1);
        assert!(dir
            .tenant_trackings(&partner, &TenantId::from("t2"))
            .is_err());
    }

    #[test]
    fn test_scoped_tenant_listing_uses_chunked_lookup() {
        let dir = fixture();
        let store = Arc::clone(dir.store());
        // Give the partner more tenants than one membership query allows.
        let mut managed: Vec<TenantId> = vec!["t1".into()];
        for i in 0..IN_QUERY_LIMIT + 5 {
            let id = format!("tx{i:02}");
            store.put_tenant(
                id.as_str(),
                TenantRecord {
                    name: Some(format!("Extra {i}")),
                    manager_id: Some("partner-1".into()),
                    ..TenantRecord::default()
                },
            );
            managed.push(id.as_str().into());
        }
        store.put_profile(
            "partner-1",
            ProfileRecord {
                role: Some("partner".to_string()),
                managed_tenant_ids: managed.clone(),
            },
        );

        let partner = dir.authenticate("bearer-partner").unwrap();
        let listing = dir.search_tenants(&partner, "").unwrap();
        assert_eq!(listing.len(), managed.len());
    }
}
