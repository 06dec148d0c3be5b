//! Core types and traits for casillero
//!
//! This crate defines the foundational pieces used throughout the system:
//! - TenantId / IdentityId / TrackingId: store-assigned document identifiers
//! - Role / Claims / Identity: the caller's privilege signals
//! - TrackingRecord / TenantRecord / ProfileRecord: persisted document shapes
//! - Error: error type hierarchy
//! - Traits: collaborator interfaces (DirectoryStore, TokenVerifier)
//! - Limits: n-gram bounds and store batch limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use limits::{CODE_ALLOC_MAX_RETRIES, IN_QUERY_LIMIT, NGRAM_MAX, NGRAM_MIN, REINDEX_BATCH_SIZE};
pub use traits::{DirectoryStore, TokenVerifier, WriteOp};
pub use types::{
    Claims, Identity, IdentityId, ProfileRecord, Role, TenantId, TenantRecord, TokenSet,
    TrackingId, TrackingRecord,
};
