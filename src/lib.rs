//! Casillero — search indexing and multi-tenant scope resolution for a
//! freight-forwarding backend
//!
//! The crate covers the two tightly-coupled subsystems behind every read in
//! the product: the tokenized substring-search index (n-gram and prefix
//! tokens over tracking codes and client records) and the role/scope
//! authorization model that decides which tenants a caller may see. The two
//! must agree on tenant boundaries: the scope gates what is visible, the
//! token index decides what a query can find.
//!
//! # Quick start
//!
//! ```
//! use casillero::{Claims, Directory, Identity, MemoryStore, ProfileRecord,
//!                 Reindexer, StaticVerifier, TenantRecord, TrackingRecord};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.put_tenant("t1", TenantRecord {
//!     name: Some("María Pérez".into()),
//!     ..TenantRecord::default()
//! });
//! store.put_tracking("p1", TrackingRecord {
//!     tracking: "1Z999AA1".into(),
//!     tenant_id: Some("t1".into()),
//!     ..TrackingRecord::default()
//! });
//! store.put_profile("u1", ProfileRecord {
//!     role: Some("operator".into()),
//!     ..ProfileRecord::default()
//! });
//!
//! // Build the token sets, then search within the caller's scope.
//! Reindexer::new(Arc::clone(&store)).trackings_full()?;
//!
//! let verifier = Arc::new(StaticVerifier::new());
//! verifier.register("bearer-1", Identity::new("u1", Claims::default()));
//!
//! let directory = Directory::new(store, verifier);
//! let caller = directory.authenticate("bearer-1")?;
//! let hits = directory.search_trackings(&caller, "999aa")?;
//! assert_eq!(hits.len(), 1);
//! # Ok::<(), casillero::Error>(())
//! ```
//!
//! Collaborators (the document database and the identity provider) are
//! consumed through the [`DirectoryStore`] and [`TokenVerifier`] traits; the
//! in-memory implementations back embedded use and tests.

// Re-export the public API from the member crates
pub use casillero_authz::{
    can_access_tenant, require_role, resolve_role, scope_filter, Resolved, ScopeFilter,
    ScopeResolver,
};
pub use casillero_core::{
    Claims, DirectoryStore, Error, Identity, IdentityId, ProfileRecord, Result, Role, TenantId,
    TenantRecord, TokenSet, TokenVerifier, TrackingId, TrackingRecord, WriteOp, IN_QUERY_LIMIT,
    NGRAM_MAX, NGRAM_MIN,
};
pub use casillero_engine::{
    allocate_code, lookup_chunked, Directory, MemoryStore, Reindexer, ReindexReport,
    StaticVerifier,
};
pub use casillero_search::{
    build_client_tokens, build_tracking_tokens, index_ngrams, ngrams, normalize, plan, PlanMode,
    SearchPlan, TrackingTokens,
};
