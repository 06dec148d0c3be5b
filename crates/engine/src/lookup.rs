//! Chunked ID-list lookups
//!
//! The document store caps membership (`in`) queries at a small fixed number
//! of IDs. That is a collaborator limitation, not a core algorithm, so it
//! lives here as one generic helper parameterized by the limit instead of
//! being embedded at every call site.

use casillero_core::error::{Error, Result};

/// Run `fetch` over `ids` in chunks of at most `limit` and merge the results.
///
/// Result order follows input chunk order. An empty `ids` slice issues no
/// queries at all.
///
/// # Errors
///
/// Returns `InvalidOperation` for a zero limit; any `fetch` error aborts the
/// remaining chunks and propagates.
pub fn lookup_chunked<K, R, F>(ids: &[K], limit: usize, mut fetch: F) -> Result<Vec<R>>
where
    F: FnMut(&[K]) -> Result<Vec<R>>,
{
    if limit == 0 {
        return Err(Error::InvalidOperation(
            "chunked lookup requires a non-zero batch limit".to_string(),
        ));
    }
    let mut out = Vec::new();
    for chunk in ids.chunks(limit) {
        out.extend(fetch(chunk)?);
    }
    Ok(out)
}
