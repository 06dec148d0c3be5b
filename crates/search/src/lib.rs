//! Search infrastructure for casillero
//!
//! This crate provides:
//! - the canonical text normalizer and n-gram generator
//! - token index builders for tracking codes and client records
//! - the query planner that maps raw input to a lookup strategy
//!
//! All three tokenize the same way, which is what makes a stored token set
//! and a planned query agree on what a match is.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod planner;
pub mod tokenizer;

// Re-export commonly used items
pub use index::{build_client_tokens, build_tracking_tokens, TrackingTokens};
pub use planner::{plan, PlanMode, SearchPlan};
pub use tokenizer::{index_ngrams, ngrams, normalize};
