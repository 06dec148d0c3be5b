//! Error types for the casillero core
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The taxonomy follows three buckets:
//! - input errors (rejected synchronously, never coerced)
//! - authorization errors (always fail closed, distinguishable from "no data")
//! - collaborator errors (store/identity provider faults, propagated upward)

use thiserror::Error;

/// Result type alias for casillero operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the casillero core
#[derive(Debug, Error)]
pub enum Error {
    /// Tokenizer called with out-of-range n-gram bounds (caller contract violation)
    #[error("invalid n-gram bounds: min {min}, max {max}")]
    InvalidTokenBounds {
        /// Requested minimum token length
        min: usize,
        /// Requested maximum token length
        max: usize,
    },

    /// Caller is not permitted to perform the operation.
    ///
    /// Surfaced as a denial at the boundary (HTTP 401/403), never as an
    /// empty-but-successful result.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Scope resolution failed (profile read error, store unreachable).
    ///
    /// Distinct from `AccessDenied`: the caller's role is unknown, not known-bad.
    /// Callers must treat this as "no access", never as "trust the claim alone".
    #[error("scope resolution failed: {0}")]
    ResolutionFailed(String),

    /// Document store error (point lookup, query, or batch commit failed)
    #[error("store error: {0}")]
    Store(String),

    /// Bearer credential could not be verified or decoded
    #[error("credential error: {0}")]
    Credential(String),

    /// Invalid operation or contract misuse (oversized `in` batch, exhausted
    /// code allocation retries, zero chunk size)
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
