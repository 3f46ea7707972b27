//! Forward-only, resumable result cursor
//!
//! A [`PaginatedCursor`] streams the results of one query page by page. It
//! holds at most one page in memory and never counts total matches: a page
//! is requested one result larger than the caller's limit, and a page that
//! comes back full means more results may follow.
//!
//! # Snapshot Leases
//!
//! Every fetch leases a snapshot, runs one bounded search, loads the page's
//! documents and hands the snapshot back before returning, whether or not
//! the fetch succeeded. No lease is held while control is with the caller.
//!
//! # Consistency
//!
//! Pages resume strictly after the last result returned, identified by its
//! [`ScoreDoc`] token. With a manager that leases the latest index version
//! on every acquire (snapshot-per-batch), results are exact for a static
//! index. If the index changes between pages, documents that move across
//! the resume point can be skipped or seen twice. Pin a single snapshot for
//! the cursor's lifetime when that matters.
//!
//! # State Machine
//!
//! ```text
//!              fetch: page full           take_next: buffer drained
//! NeedsFetch ─────────────────────▶ Buffered{may_have_more: true} ──▶ NeedsFetch
//!     │        fetch: page short
//!     ├──────────────────────────▶ Buffered{may_have_more: false} ──▶ Exhausted
//!     │        fetch: page empty
//!     └──────────────────────────▶ Exhausted
//! ```

use crate::config::SearchConfig;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use strata_core::{
    Error, FieldSelection, Hit, Limit, QueryOf, Result, ScoreDoc, Searcher, SnapshotLease,
    SnapshotLeaseManager, Sort,
};
use tracing::debug;

/// Default cap on the number of results requested by one fetch
pub const DEFAULT_MAX_PAGE_SIZE: usize = 10_000;

// ============================================================================
// CursorState / CursorStats
// ============================================================================

/// Where a cursor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Buffer empty, more results may exist; the next `has_more` fetches
    NeedsFetch,
    /// Buffer holds at least one result
    Buffered {
        /// Whether the last page was full, so another fetch is due once
        /// the buffer drains
        may_have_more: bool,
    },
    /// Buffer empty and no more results will ever be fetched
    Exhausted,
}

/// Counters for one cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorStats {
    /// Completed fetches (one snapshot lease each)
    pub fetches: u64,
    /// Fetches that failed after leasing or while leasing
    pub failed_fetches: u64,
    /// Results loaded into the buffer
    pub documents_fetched: u64,
    /// Results handed to the caller
    pub documents_returned: u64,
}

/// A page loaded under one lease, not yet applied to the cursor
struct LoadedPage {
    hits: Vec<Hit>,
    total_hits: usize,
    generation: u64,
    resolved_sort: Option<Sort>,
}

// ============================================================================
// PaginatedCursor
// ============================================================================

/// Streams the results of a query in bounded pages
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strata_core::{Document, FieldSelection, Limit};
/// use strata_search::{InvertedIndex, PaginatedCursor, Query, SnapshotManager};
///
/// let index = Arc::new(InvertedIndex::new());
/// for name in ["Ann Lee", "Bo Lee", "Cy Lee"] {
///     index.add_document(Document::new().with_field("name", name)).unwrap();
/// }
/// let manager = Arc::new(SnapshotManager::new(index));
///
/// let mut cursor = PaginatedCursor::new(
///     manager,
///     Query::term("name", "lee"),
///     None,
///     None,
///     Limit::Bounded(2),
///     FieldSelection::All,
/// );
///
/// let mut names = Vec::new();
/// while cursor.has_more().unwrap() {
///     let (doc, _token) = cursor.take_next().unwrap();
///     names.push(doc.get_text("name").unwrap().to_string());
/// }
/// assert_eq!(names, ["Ann Lee", "Bo Lee", "Cy Lee"]);
/// ```
pub struct PaginatedCursor<M: SnapshotLeaseManager> {
    manager: Arc<M>,
    query: QueryOf<M>,
    sort: Option<Sort>,
    /// Sort resolved against the snapshot of the given generation
    resolved_sort: Option<(u64, Sort)>,
    after: Option<ScoreDoc>,
    limit: Limit,
    max_page_size: usize,
    fields: FieldSelection,
    buffer: VecDeque<Hit>,
    state: CursorState,
    stats: CursorStats,
}

impl<M: SnapshotLeaseManager> PaginatedCursor<M> {
    /// Create a cursor
    ///
    /// # Arguments
    /// * `manager` - Source of index snapshots
    /// * `query` - Query to stream results for
    /// * `sort` - Sort order; `None` for descending relevance
    /// * `after` - Token of the last result already seen; `None` to start at the beginning
    /// * `limit` - Page size requested from the caller
    /// * `fields` - Stored fields to load for each result
    ///
    /// A `Limit::Bounded(0)` cursor is exhausted from the start and never
    /// leases a snapshot.
    pub fn new(
        manager: Arc<M>,
        query: QueryOf<M>,
        sort: Option<Sort>,
        after: Option<ScoreDoc>,
        limit: impl Into<Limit>,
        fields: FieldSelection,
    ) -> Self {
        let limit = limit.into();
        let state = if limit == Limit::Bounded(0) {
            CursorState::Exhausted
        } else {
            CursorState::NeedsFetch
        };
        PaginatedCursor {
            manager,
            query,
            sort,
            resolved_sort: None,
            after,
            limit,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            fields,
            buffer: VecDeque::new(),
            state,
            stats: CursorStats::default(),
        }
    }

    /// Builder: cap the number of results one fetch may request (minimum 1)
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    /// Builder: apply paging settings from `config`
    pub fn with_config(self, config: &SearchConfig) -> Self {
        self.with_max_page_size(config.max_page_size)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of results requested per fetch
    ///
    /// One more than the page size for bounded limits; that extra result is
    /// how a full page is told apart from the last one. Unbounded cursors
    /// request `max_page_size` results and treat a full page the same way.
    pub fn batch_size(&self) -> usize {
        match self.limit {
            Limit::Bounded(limit) => limit.min(self.max_page_size).saturating_add(1),
            Limit::Unbounded => self.max_page_size,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Whether the next `has_more` call will fetch
    pub fn needs_fetch(&self) -> bool {
        self.state == CursorState::NeedsFetch
    }

    /// Whether another fetch may still happen once the buffer drains
    pub fn may_have_more(&self) -> bool {
        match self.state {
            CursorState::NeedsFetch => true,
            CursorState::Buffered { may_have_more } => may_have_more,
            CursorState::Exhausted => false,
        }
    }

    /// Number of results buffered and not yet taken
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Token the next fetch will resume after
    ///
    /// Points at the last result fetched, which can be ahead of the last
    /// result taken while the buffer is not empty.
    pub fn after(&self) -> Option<&ScoreDoc> {
        self.after.as_ref()
    }

    /// Query this cursor streams
    pub fn query(&self) -> &QueryOf<M> {
        &self.query
    }

    /// Sort requested at construction
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Counters
    pub fn stats(&self) -> CursorStats {
        self.stats
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Whether another result is available, fetching a page if needed
    ///
    /// This is the only call that may block on the index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchExecution`] if a fetch fails. Lease failures
    /// are wrapped too, with [`Error::LeaseAcquisition`] as the source, and
    /// report [`strata_core::ErrorKind::LeaseAcquisition`] from `kind()`.
    /// The buffer and resume token are left untouched so the call can be
    /// retried.
    pub fn has_more(&mut self) -> Result<bool> {
        match self.state {
            CursorState::Buffered { .. } => Ok(true),
            CursorState::Exhausted => Ok(false),
            CursorState::NeedsFetch => {
                self.fetch()?;
                Ok(!self.buffer.is_empty())
            }
        }
    }

    /// Take the next result, oldest first
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExhaustedIterator`] when no result is left, or any
    /// error [`PaginatedCursor::has_more`] can return.
    pub fn take_next(&mut self) -> Result<Hit> {
        if !self.has_more()? {
            return Err(Error::ExhaustedIterator);
        }
        let Some(hit) = self.buffer.pop_front() else {
            return Err(Error::ExhaustedIterator);
        };
        if self.buffer.is_empty() {
            self.state = if self.may_have_more() {
                CursorState::NeedsFetch
            } else {
                CursorState::Exhausted
            };
        }
        self.stats.documents_returned += 1;
        Ok(hit)
    }

    /// Stop iterating and drop buffered results
    ///
    /// Idempotent. No lease is held between calls, so there is nothing to
    /// release and this never blocks.
    pub fn close(&mut self) {
        if self.state == CursorState::Exhausted && self.buffer.is_empty() {
            return;
        }
        debug!(
            dropped = self.buffer.len(),
            returned = self.stats.documents_returned,
            "Cursor closed"
        );
        self.buffer.clear();
        self.state = CursorState::Exhausted;
    }

    // ========================================================================
    // Fetch
    // ========================================================================

    fn fetch(&mut self) -> Result<()> {
        let start = Instant::now();
        let batch_size = self.batch_size();
        let manager = Arc::clone(&self.manager);

        let page = match SnapshotLease::acquire(manager.as_ref()) {
            Ok(lease) => {
                let page = self.load_page(&lease, batch_size);
                lease.release();
                page
            }
            Err(e) => Err(self.search_error(Box::new(e))),
        };
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                self.stats.failed_fetches += 1;
                debug!(error = %e, kind = %e.kind(), "Fetch failed");
                return Err(e);
            }
        };

        let count = page.hits.len();
        let may_have_more = count >= batch_size;
        if let Some((_, last)) = page.hits.last() {
            self.after = Some(last.clone());
        }
        if let Some(resolved) = page.resolved_sort {
            self.resolved_sort = Some((page.generation, resolved));
        }
        self.buffer.extend(page.hits);
        self.state = if self.buffer.is_empty() {
            CursorState::Exhausted
        } else {
            CursorState::Buffered { may_have_more }
        };
        self.stats.fetches += 1;
        self.stats.documents_fetched += count as u64;

        debug!(
            documents = count,
            batch_size,
            total_hits = page.total_hits,
            generation = page.generation,
            may_have_more,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Fetched page"
        );
        Ok(())
    }

    /// Run one bounded search and load its documents without touching `self`
    fn load_page(&self, snapshot: &M::Snapshot, batch_size: usize) -> Result<LoadedPage> {
        let generation = snapshot.generation();

        let resolved_sort = match &self.sort {
            None => None,
            Some(sort) => match &self.resolved_sort {
                Some((resolved_at, resolved)) if *resolved_at == generation => {
                    Some(resolved.clone())
                }
                _ => Some(
                    snapshot
                        .resolve_sort(sort)
                        .map_err(|e| self.search_error(e))?,
                ),
            },
        };

        let top = snapshot
            .search_after(
                &self.query,
                resolved_sort.as_ref(),
                self.after.as_ref(),
                batch_size,
            )
            .map_err(|e| self.search_error(e))?;

        let mut hits = Vec::with_capacity(top.score_docs.len());
        for score_doc in top.score_docs {
            let document = snapshot
                .load_document(score_doc.doc, &self.fields)
                .map_err(|e| self.search_error(e))?;
            hits.push((document, score_doc));
        }

        Ok(LoadedPage {
            hits,
            total_hits: top.total_hits,
            generation,
            resolved_sort,
        })
    }

    fn search_error(&self, source: strata_core::BoxError) -> Error {
        Error::search_execution(
            &self.query,
            self.sort.as_ref().map(|s| s as &dyn fmt::Debug),
            source,
        )
    }
}

impl<M: SnapshotLeaseManager> Iterator for PaginatedCursor<M> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_more() {
            Ok(true) => Some(self.take_next()),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<M: SnapshotLeaseManager> fmt::Debug for PaginatedCursor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedCursor")
            .field("query", &self.query)
            .field("sort", &self.sort)
            .field("after", &self.after)
            .field("limit", &self.limit)
            .field("batch_size", &self.batch_size())
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .finish()
    }
}

// ============================================================================
// CursorBuilder
// ============================================================================

/// Fluent construction of a [`PaginatedCursor`]
///
/// Defaults: relevance order, start of stream, unbounded limit, all fields.
pub struct CursorBuilder<M: SnapshotLeaseManager> {
    manager: Arc<M>,
    query: QueryOf<M>,
    sort: Option<Sort>,
    after: Option<ScoreDoc>,
    limit: Limit,
    fields: FieldSelection,
    max_page_size: usize,
}

impl<M: SnapshotLeaseManager> CursorBuilder<M> {
    /// Start building a cursor for `query`
    pub fn new(manager: Arc<M>, query: QueryOf<M>) -> Self {
        CursorBuilder {
            manager,
            query,
            sort: None,
            after: None,
            limit: Limit::Unbounded,
            fields: FieldSelection::All,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Builder: set sort order
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Builder: resume after a previously returned result
    pub fn after(mut self, after: ScoreDoc) -> Self {
        self.after = Some(after);
        self
    }

    /// Builder: set page size
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = limit.into();
        self
    }

    /// Builder: restrict loaded fields
    pub fn fields(mut self, fields: FieldSelection) -> Self {
        self.fields = fields;
        self
    }

    /// Builder: cap results per fetch
    pub fn max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Build the cursor (no I/O happens until the first `has_more`)
    pub fn build(self) -> PaginatedCursor<M> {
        PaginatedCursor::new(
            self.manager,
            self.query,
            self.sort,
            self.after,
            self.limit,
            self.fields,
        )
        .with_max_page_size(self.max_page_size)
    }
}
