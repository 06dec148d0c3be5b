//! Chunked, resumable batch re-tokenization
//!
//! Reindex passes walk a collection in bounded batches ordered by document
//! ID, rebuild each record's token set from its current source fields, and
//! commit one batch of full-replacement writes per chunk. A pass is safe to
//! abandon at any record boundary: the returned cursor restarts it exactly
//! where it stopped, and every record write is idempotent (the rebuild is a
//! pure function of the source fields, not of prior token state).
//!
//! Records whose stored tokens already match the rebuild are skipped;
//! records whose source fields normalize to nothing are counted as
//! unindexable and left alone. Neither is an error.

use casillero_core::error::Result;
use casillero_core::limits::REINDEX_BATCH_SIZE;
use casillero_core::traits::{DirectoryStore, WriteOp};
use casillero_core::types::{TenantId, TrackingId};
use casillero_search::index::{build_client_tokens, build_tracking_tokens};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters for one reindex pass (or one chunk of it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Records read from the store
    pub scanned: usize,
    /// Records whose token set was rebuilt and written
    pub indexed: usize,
    /// Records already carrying the exact rebuilt token set
    pub skipped: usize,
    /// Records whose source fields normalize to nothing
    pub unindexable: usize,
}

impl ReindexReport {
    fn merge(&mut self, other: ReindexReport) {
        self.scanned += other.scanned;
        self.indexed += other.indexed;
        self.skipped += other.skipped;
        self.unindexable += other.unindexable;
    }
}

/// Batch re-tokenization runner over a [`DirectoryStore`]
pub struct Reindexer<S> {
    store: Arc<S>,
    batch_size: usize,
}

impl<S: DirectoryStore> Reindexer<S> {
    /// Create a runner with the default batch size
    pub fn new(store: Arc<S>) -> Self {
        Reindexer {
            store,
            batch_size: REINDEX_BATCH_SIZE,
        }
    }

    /// Override the records-per-chunk bound
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Process one chunk of tracking records after `cursor`.
    ///
    /// Returns the chunk's report and the cursor for the next chunk, or
    /// `None` when the collection is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a store error if the page read or the batch commit fails; the
    /// chunk can be retried from the same cursor.
    pub fn trackings_chunk(
        &self,
        cursor: Option<&TrackingId>,
    ) -> Result<(ReindexReport, Option<TrackingId>)> {
        let page = self.store.trackings_after(cursor, self.batch_size)?;
        let mut report = ReindexReport::default();
        let mut batch = Vec::new();

        for (id, record) in &page {
            report.scanned += 1;
            let built = build_tracking_tokens(&record.tracking);
            if built.normalized.is_empty() {
                report.unindexable += 1;
                continue;
            }
            if record.tracking_tokens.as_ref() == Some(&built.tokens) {
                report.skipped += 1;
                continue;
            }
            batch.push(WriteOp::SetTrackingTokens {
                id: id.clone(),
                normalized: built.normalized,
                tokens: built.tokens,
            });
            report.indexed += 1;
        }

        if !batch.is_empty() {
            self.store.commit(batch)?;
        }

        let next = next_cursor(&page, self.batch_size);
        debug!(?report, resumes = next.is_some(), "tracking reindex chunk done");
        Ok((report, next))
    }

    /// Run the tracking pass to completion from the start
    ///
    /// # Errors
    ///
    /// Returns the first store error; progress up to the failing chunk is
    /// already committed and a rerun will skip it.
    pub fn trackings_full(&self) -> Result<ReindexReport> {
        let mut report = ReindexReport::default();
        let mut cursor: Option<TrackingId> = None;
        loop {
            let (chunk, next) = self.trackings_chunk(cursor.as_ref())?;
            report.merge(chunk);
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        info!(?report, "tracking reindex pass complete");
        Ok(report)
    }

    /// Process one chunk of tenant records after `cursor`
    ///
    /// # Errors
    ///
    /// Returns a store error if the page read or the batch commit fails.
    pub fn tenants_chunk(
        &self,
        cursor: Option<&TenantId>,
    ) -> Result<(ReindexReport, Option<TenantId>)> {
        let page = self.store.tenants_after(cursor, self.batch_size)?;
        let mut report = ReindexReport::default();
        let mut batch = Vec::new();

        for (id, record) in &page {
            report.scanned += 1;
            let tokens = build_client_tokens(
                record.name.as_deref(),
                record.code.as_deref(),
                record.email.as_deref(),
            );
            if tokens.is_empty() {
                report.unindexable += 1;
                continue;
            }
            if record.client_tokens.as_ref() == Some(&tokens) {
                report.skipped += 1;
                continue;
            }
            batch.push(WriteOp::SetClientTokens {
                id: id.clone(),
                tokens,
            });
            report.indexed += 1;
        }

        if !batch.is_empty() {
            self.store.commit(batch)?;
        }

        let next = next_cursor(&page, self.batch_size);
        debug!(?report, resumes = next.is_some(), "tenant reindex chunk done");
        Ok((report, next))
    }

    /// Run the tenant pass to completion from the start
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub fn tenants_full(&self) -> Result<ReindexReport> {
        let mut report = ReindexReport::default();
        let mut cursor: Option<TenantId> = None;
        loop {
            let (chunk, next) = self.tenants_chunk(cursor.as_ref())?;
            report.merge(chunk);
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        info!(?report, "tenant reindex pass complete");
        Ok(report)
    }
}

// A short page means the collection is exhausted.
fn next_cursor<K: Clone, V>(page: &[(K, V)], batch_size: usize) -> Option<K> {
    if page.len() < batch_size {
        None
    } else {
        page.last().map(|(id, _)| id.clone())
    }
}
