//! Shared test utilities for the workspace integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use stratacursor::{
    DocId, Document, FieldSelection, Hit, InvertedIndex, Limit, PaginatedCursor, Query, Result,
    ScoreDoc, SnapshotLeaseManager, Sort,
};

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
// Corpus
// ============================================================================

const WORDS: [&str; 6] = ["alpha", "beta", "gamma", "delta", "omega", "sigma"];

/// Deterministic document `i`: a few words, a year, and a title
pub fn corpus_doc(i: u64) -> Document {
    let body = (0..(i % 4 + 1))
        .map(|j| WORDS[((i * 7 + j * 3) % WORDS.len() as u64) as usize])
        .collect::<Vec<_>>()
        .join(" ");
    Document::new()
        .with_field("title", format!("doc {}", i))
        .with_field("body", body)
        .with_field("year", 1950 + (i * 13 % 70) as i64)
}

/// Index populated with `corpus_doc(0..n)`
pub fn corpus_index(n: u64) -> Arc<InvertedIndex> {
    let index = Arc::new(InvertedIndex::new());
    for i in 0..n {
        index.add_document(corpus_doc(i)).unwrap();
    }
    index
}

// ============================================================================
// Draining
// ============================================================================

/// Ids of every remaining hit
pub fn drain_ids<M: SnapshotLeaseManager>(cursor: PaginatedCursor<M>) -> Vec<DocId> {
    cursor.map(|hit| hit.unwrap().1.doc).collect()
}

/// Read a stream as separate cursor sessions of at most `limit` hits each,
/// each resuming from the previous session's last token
pub fn paged_sessions<M>(
    manager: &Arc<M>,
    query: Query,
    sort: Option<Sort>,
    limit: usize,
) -> Result<Vec<Vec<Hit>>>
where
    M: SnapshotLeaseManager,
    M::Snapshot: stratacursor::Searcher<Query = Query>,
{
    let mut pages = Vec::new();
    let mut after: Option<ScoreDoc> = None;
    loop {
        let mut cursor = PaginatedCursor::new(
            Arc::clone(manager),
            query.clone(),
            sort.clone(),
            after.clone(),
            Limit::Bounded(limit),
            FieldSelection::All,
        );
        let mut page = Vec::new();
        while page.len() < limit && cursor.has_more()? {
            page.push(cursor.take_next()?);
        }
        cursor.close();
        if page.is_empty() {
            return Ok(pages);
        }
        after = page.last().map(|(_, token)| token.clone());
        pages.push(page);
    }
}
