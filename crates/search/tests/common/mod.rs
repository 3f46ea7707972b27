//! Shared test utilities for cursor integration tests.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use strata_core::{
    BoxError, DocId, Document, FieldSelection, ScoreDoc, Searcher, SnapshotLeaseManager, Sort,
    TopDocs,
};
use strata_search::{IndexSnapshot, InvertedIndex, LeaseStats, Query, SnapshotManager};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

/// Index holding D1..D5 where a "fox" term query ranks them D3, D1, D5, D2, D4
///
/// Every body has five tokens so only term frequency separates the scores.
/// Returns the index and the ids of D1..D5 in that order.
pub fn ranked_index() -> (Arc<InvertedIndex>, Vec<DocId>) {
    let index = Arc::new(InvertedIndex::new());
    let fox_counts = [4, 2, 5, 1, 3];
    let ids = fox_counts
        .iter()
        .enumerate()
        .map(|(i, &foxes)| {
            let body = std::iter::repeat("fox")
                .take(foxes)
                .chain(std::iter::repeat("pad").take(5 - foxes))
                .collect::<Vec<_>>()
                .join(" ");
            index
                .add_document(
                    Document::new()
                        .with_field("name", format!("D{}", i + 1))
                        .with_field("body", body)
                        .with_field("rank", (i + 1) as i64),
                )
                .unwrap()
        })
        .collect();
    (index, ids)
}

/// Index of `n` documents with an integer `n` field and a shared text field
pub fn numbered_index(n: usize) -> Arc<InvertedIndex> {
    let index = Arc::new(InvertedIndex::new());
    for i in 0..n {
        index
            .add_document(
                Document::new()
                    .with_field("n", i as i64)
                    .with_field("body", "common words here"),
            )
            .unwrap();
    }
    index
}

/// Names ("D1", ...) of yielded hits
pub fn names(hits: &[(Document, ScoreDoc)]) -> Vec<String> {
    hits.iter()
        .map(|(doc, _)| doc.get_text("name").unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// FaultyManager - injects failures at each collaborator call
// ============================================================================

/// Failure counters: each `fail_*` field fails that many upcoming calls
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_acquire: AtomicUsize,
    pub fail_resolve: AtomicUsize,
    pub fail_search: AtomicUsize,
    pub fail_load: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl Faults {
    fn trip(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug)]
struct InjectedFault(&'static str);

impl std::fmt::Display for InjectedFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "injected {} failure", self.0)
    }
}

impl std::error::Error for InjectedFault {}

/// [`SnapshotManager`] wrapper with switchable failures
pub struct FaultyManager {
    inner: SnapshotManager,
    pub faults: Arc<Faults>,
}

impl FaultyManager {
    pub fn new(index: Arc<InvertedIndex>) -> Self {
        FaultyManager {
            inner: SnapshotManager::new(index),
            faults: Arc::new(Faults::default()),
        }
    }

    pub fn index(&self) -> &Arc<InvertedIndex> {
        self.inner.index()
    }

    pub fn lease_stats(&self) -> LeaseStats {
        self.inner.lease_stats()
    }
}

/// Snapshot whose calls can be made to fail
pub struct FaultySnapshot {
    inner: IndexSnapshot,
    faults: Arc<Faults>,
}

impl SnapshotLeaseManager for FaultyManager {
    type Snapshot = FaultySnapshot;

    fn acquire(&self) -> Result<FaultySnapshot, BoxError> {
        if Faults::trip(&self.faults.fail_acquire) {
            return Err(Box::new(InjectedFault("acquire")));
        }
        Ok(FaultySnapshot {
            inner: self.inner.acquire()?,
            faults: Arc::clone(&self.faults),
        })
    }

    fn release(&self, snapshot: FaultySnapshot) {
        self.inner.release(snapshot.inner);
    }
}

impl Searcher for FaultySnapshot {
    type Query = Query;

    fn generation(&self) -> u64 {
        self.inner.generation()
    }

    fn resolve_sort(&self, sort: &Sort) -> Result<Sort, BoxError> {
        self.faults.resolve_calls.fetch_add(1, Ordering::AcqRel);
        if Faults::trip(&self.faults.fail_resolve) {
            return Err(Box::new(InjectedFault("resolve")));
        }
        self.inner.resolve_sort(sort)
    }

    fn search_after(
        &self,
        query: &Query,
        sort: Option<&Sort>,
        after: Option<&ScoreDoc>,
        n: usize,
    ) -> Result<TopDocs, BoxError> {
        self.faults.search_calls.fetch_add(1, Ordering::AcqRel);
        if Faults::trip(&self.faults.fail_search) {
            return Err(Box::new(InjectedFault("search")));
        }
        self.inner.search_after(query, sort, after, n)
    }

    fn load_document(&self, doc: DocId, fields: &FieldSelection) -> Result<Document, BoxError> {
        if Faults::trip(&self.faults.fail_load) {
            return Err(Box::new(InjectedFault("load")));
        }
        self.inner.load_document(doc, fields)
    }
}
