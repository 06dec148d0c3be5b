//! Fixed limits shared by the tokenizer, planner, and store boundary
//!
//! The n-gram bounds are part of the persisted index contract: changing them
//! invalidates every stored token set and requires a full reindex pass.

/// Minimum indexed/queryable token length.
///
/// Substrings shorter than this are never generated and never looked up;
/// 1-2 character queries fall back to client-side filtering of an
/// already-scoped listing.
pub const NGRAM_MIN: usize = 3;

/// Maximum generated token length.
///
/// Queries longer than this are clamped to their first `NGRAM_MAX` characters
/// for the index lookup and refined by substring containment afterwards.
pub const NGRAM_MAX: usize = 8;

/// Maximum number of IDs per membership (`in`) query.
///
/// A collaborator limitation of the document store, not a core algorithm.
/// Larger ID lists must go through the chunked lookup helper.
pub const IN_QUERY_LIMIT: usize = 10;

/// Default number of records per batch during a reindex pass.
pub const REINDEX_BATCH_SIZE: usize = 200;

/// Retry budget for tenant code allocation against the code counter.
pub const CODE_ALLOC_MAX_RETRIES: usize = 5;
