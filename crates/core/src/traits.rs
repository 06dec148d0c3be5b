//! Collaborator traits for the document store and the identity provider
//!
//! Both collaborators are external services; the core only sees these narrow
//! interfaces. The store exposes point lookups, equality queries, bounded
//! membership queries and all-or-nothing batch commits. The identity provider
//! verifies bearer credentials and manages custom claims.

use crate::error::Result;
use crate::types::{
    Claims, Identity, IdentityId, ProfileRecord, TenantId, TenantRecord, TokenSet, TrackingId,
    TrackingRecord,
};

/// One write in an all-or-nothing batch commit.
///
/// Token writes replace the stored set in full; there is no partial patch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace a tracking record's normalized form and token set
    SetTrackingTokens {
        /// Target tracking document
        id: TrackingId,
        /// Canonical form of the tracking code
        normalized: String,
        /// Full replacement token set
        tokens: TokenSet,
    },
    /// Replace a tenant record's search token set
    SetClientTokens {
        /// Target tenant document
        id: TenantId,
        /// Full replacement token set
        tokens: TokenSet,
    },
    /// Write the denormalized managed-tenant cache onto a profile record
    SetManagedTenants {
        /// Target profile (identity ID)
        id: IdentityId,
        /// Authoritative managed-tenant list at sync time
        tenant_ids: Vec<TenantId>,
    },
    /// Assign a tenant its unique client code
    SetTenantCode {
        /// Target tenant document
        id: TenantId,
        /// Allocated code
        code: String,
    },
}

/// Narrow interface over the external document store.
///
/// Thread safety: all methods must be safe to call concurrently from multiple
/// requests (requires Send + Sync). Implementations translate their native
/// failures into [`crate::Error::Store`].
pub trait DirectoryStore: Send + Sync {
    /// Point lookup of a profile record by identity ID
    ///
    /// Returns `None` when no profile document exists for the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails; resolution treats that as a
    /// fail-closed outcome, never as "no profile".
    fn profile(&self, id: &IdentityId) -> Result<Option<ProfileRecord>>;

    /// Point lookup of a tenant record by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn tenant(&self, id: &TenantId) -> Result<Option<TenantRecord>>;

    /// Equality query: the tenant holding a client code, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn tenant_by_code(&self, code: &str) -> Result<Option<(TenantId, TenantRecord)>>;

    /// Equality query: all tenants whose `managerId` equals the given identity
    ///
    /// This is the authoritative "managed-by" relationship behind the cached
    /// `managedTenantIds` list.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn tenants_managed_by(&self, manager: &IdentityId) -> Result<Vec<(TenantId, TenantRecord)>>;

    /// Membership query over tenant IDs.
    ///
    /// `ids.len()` must not exceed [`crate::limits::IN_QUERY_LIMIT`] (the
    /// store's `in` operator limit); callers with larger lists go through the
    /// chunked lookup helper.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` on an oversized batch, or `Store` on a
    /// query failure.
    fn tenants_by_ids(&self, ids: &[TenantId]) -> Result<Vec<(TenantId, TenantRecord)>>;

    /// Membership query: tenants whose token set contains `token`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn tenants_with_token(&self, token: &str) -> Result<Vec<(TenantId, TenantRecord)>>;

    /// Equality query: all trackings owned by a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn trackings_for_tenant(&self, tenant: &TenantId) -> Result<Vec<(TrackingId, TrackingRecord)>>;

    /// Membership query: trackings whose token set contains `token`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn trackings_with_token(&self, token: &str) -> Result<Vec<(TrackingId, TrackingRecord)>>;

    /// Page of trackings ordered by document ID, strictly after `cursor`.
    ///
    /// The stable ordering is what makes batch passes resumable: a pass can
    /// be abandoned at any record boundary and restarted from the last ID it
    /// processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn trackings_after(
        &self,
        cursor: Option<&TrackingId>,
        limit: usize,
    ) -> Result<Vec<(TrackingId, TrackingRecord)>>;

    /// Page of tenants ordered by document ID, strictly after `cursor`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn tenants_after(
        &self,
        cursor: Option<&TenantId>,
        limit: usize,
    ) -> Result<Vec<(TenantId, TenantRecord)>>;

    /// Atomically increment and return a named counter.
    ///
    /// Used by tenant code allocation; the store guarantees two callers never
    /// observe the same value.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    fn next_counter(&self, name: &str) -> Result<u64>;

    /// Apply a batch of writes with all-or-nothing semantics.
    ///
    /// Either every op lands or none does; a failed commit leaves the store
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the commit fails.
    fn commit(&self, batch: Vec<WriteOp>) -> Result<()>;
}

/// Narrow interface over the external identity provider
pub trait TokenVerifier: Send + Sync {
    /// Verify and decode a bearer credential into an identity plus claims
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Credential`] for invalid, expired or unknown
    /// credentials.
    fn verify(&self, bearer: &str) -> Result<Identity>;

    /// Write custom claims for an identity.
    ///
    /// Takes effect only on the caller's next credential refresh; until then
    /// the old claims keep circulating, which is why role resolution treats
    /// the profile record as authoritative for the partner tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is unknown or the write fails.
    fn set_claims(&self, id: &IdentityId, claims: &Claims) -> Result<()>;
}
