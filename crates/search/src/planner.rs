//! Search query planning
//!
//! Translates a raw user-entered search string into one of three lookup
//! strategies, chosen by input length. The planner only decides *how* to look
//! a query up; tenant scoping is applied by the caller as a hard boundary
//! before any token matching happens.

use crate::tokenizer::normalize;
use casillero_core::limits::{NGRAM_MAX, NGRAM_MIN};

/// Lookup strategy for one search input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Empty input: show the unfiltered (but still scope-bounded) listing
    None,
    /// 1-2 character input: filter an already-scoped listing client-side by
    /// substring containment; no global index lookup is issued
    ScopedSubstring,
    /// 3+ character input: membership lookup against the stored token sets,
    /// intersected with the caller's permitted tenant set
    GlobalToken,
}

/// A planned search: the chosen mode plus the normalized query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// Chosen lookup strategy
    pub mode: PlanMode,
    /// Query after the canonical transform; empty for `PlanMode::None`
    pub normalized: String,
}

impl SearchPlan {
    fn none() -> Self {
        SearchPlan {
            mode: PlanMode::None,
            normalized: String::new(),
        }
    }

    /// The membership token to look up for a `GlobalToken` plan.
    ///
    /// Stored tokens never exceed `NGRAM_MAX` characters, so longer queries
    /// are clamped to their first `NGRAM_MAX` characters for the index lookup
    /// and refined by substring containment on the candidates. Whole-word and
    /// whole-code tokens may be longer, so the full normalized query is tried
    /// by callers that want exact hits first.
    pub fn token(&self) -> String {
        self.normalized.chars().take(NGRAM_MAX).collect()
    }
}

/// Plan a raw search input.
///
/// Mode selection: empty after trimming is `None`; fewer than `NGRAM_MIN`
/// normalized characters is `ScopedSubstring`; otherwise `GlobalToken`. The
/// gate runs on the normalized form so inputs like `"a b"` (which normalize
/// below the minimum token length) never issue a global lookup that cannot
/// match.
pub fn plan(raw: &str) -> SearchPlan {
    if raw.trim().is_empty() {
        return SearchPlan::none();
    }
    let normalized = normalize(raw);
    if normalized.is_empty() {
        // Defensive: trimming said non-empty, normalization disagreed.
        return SearchPlan::none();
    }
    let mode = if normalized.chars().count() < NGRAM_MIN {
        PlanMode::ScopedSubstring
    } else {
        PlanMode::GlobalToken
    };
    SearchPlan { mode, normalized }
}
