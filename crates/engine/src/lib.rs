//! Orchestration layer for casillero
//!
//! This crate ties the search and authorization crates to the document
//! store boundary:
//! - [`Directory`]: authenticate a bearer, resolve scope once, then search
//!   and read within that scope
//! - [`Reindexer`]: chunked, resumable batch re-tokenization passes
//! - [`lookup_chunked`]: membership queries split to the store's `in` limit
//! - [`allocate_code`]: unique client code assignment against a counter
//! - [`MemoryStore`] / [`StaticVerifier`]: in-memory collaborator
//!   implementations for embedded use and tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod lookup;
pub mod memory;
pub mod reindex;
pub mod scoped;

// Re-export commonly used items
pub use codes::allocate_code;
pub use lookup::lookup_chunked;
pub use memory::{MemoryStore, StaticVerifier};
pub use reindex::{Reindexer, ReindexReport};
pub use scoped::Directory;
