//! Core traits for snapshot and search abstraction
//!
//! This module defines the collaborator contracts a cursor consumes:
//! - `SnapshotLeaseManager` hands out and takes back read-only index views
//! - `Searcher` is one such view, able to run "next page after token" queries
//!
//! These traits enable swapping the index implementation (in-memory,
//! segmented, remote shard) without touching the cursor.

use crate::error::BoxError;
use crate::search_types::{DocId, Document, FieldSelection, ScoreDoc, Sort, TopDocs};
use std::fmt;

/// Consistent, read-only view of an index at one point in time
///
/// Implementations must return the same answers for the same calls for as
/// long as the view is alive, regardless of concurrent writers.
pub trait Searcher {
    /// Query type understood by this index; opaque to cursors
    type Query: fmt::Debug;

    /// Generation of the index state this view reflects
    ///
    /// Two views with the same generation are interchangeable. Cursors use
    /// this to decide whether a previously resolved sort can be reused.
    fn generation(&self) -> u64;

    /// Bind every field of `sort` to a concrete type valid for this view
    ///
    /// Must be idempotent: resolving an already resolved sort against any
    /// view with the same schema yields the same logical order.
    ///
    /// # Errors
    ///
    /// Returns an error if a field's bound type disagrees with the index.
    /// Fields the view has never stored are not an error; every document
    /// sorts as missing on them.
    fn resolve_sort(&self, sort: &Sort) -> Result<Sort, BoxError>;

    /// Up to `n` results matching `query`, strictly after `after`
    ///
    /// Ordered by `sort` when present (which must already be resolved),
    /// otherwise by descending relevance. `after == None` means from the
    /// start of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the search cannot be executed.
    fn search_after(
        &self,
        query: &Self::Query,
        sort: Option<&Sort>,
        after: Option<&ScoreDoc>,
        n: usize,
    ) -> Result<TopDocs, BoxError>;

    /// Load the stored fields of one document, restricted to `fields`
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not visible in this view.
    fn load_document(&self, doc: DocId, fields: &FieldSelection) -> Result<Document, BoxError>;
}

/// Source of leased index views
///
/// Every successful `acquire` must be paired with exactly one `release`, even
/// when the work done with the view failed. Callers should go through
/// [`crate::SnapshotLease`] rather than pairing the calls by hand.
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). Acquire/release happen once per
/// fetched page, so both must be cheap.
pub trait SnapshotLeaseManager: Send + Sync {
    /// The leased view type
    type Snapshot: Searcher;

    /// Lease a view of the index
    ///
    /// # Errors
    ///
    /// Returns an error if no view can be produced (index closed, etc.).
    fn acquire(&self) -> Result<Self::Snapshot, BoxError>;

    /// Return a view obtained from [`SnapshotLeaseManager::acquire`]
    ///
    /// Must not fail and must not block on I/O.
    fn release(&self, snapshot: Self::Snapshot);
}

/// Shorthand for the query type of a manager's snapshots
pub type QueryOf<M> = <<M as SnapshotLeaseManager>::Snapshot as Searcher>::Query;
