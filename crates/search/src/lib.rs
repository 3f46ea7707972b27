//! Paginated search cursors and the in-memory index behind them
//!
//! This crate provides:
//! - PaginatedCursor: forward-only, resumable streaming of query results
//! - Scorer trait for pluggable scoring algorithms (BM25, no-IDF)
//! - ScorerContext for corpus-level statistics
//! - InvertedIndex: copy-on-write in-memory index with immutable snapshots
//! - SnapshotManager / PinnedSnapshotManager: snapshot lease managers
//! - SearchConfig: `search.toml` loading
//! - Basic tokenizer
//! - CursorExt extension trait for `manager.cursor(query)`
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::Document;
//! use strata_search::{CursorExt, InvertedIndex, Query, SnapshotManager};
//!
//! let index = Arc::new(InvertedIndex::new());
//! index.add_document(Document::new().with_field("body", "quick brown fox")).unwrap();
//! let manager = Arc::new(SnapshotManager::new(index));
//!
//! let hits: Vec<_> = manager
//!     .cursor(Query::term("body", "fox"))
//!     .limit(10)
//!     .build()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod index;
pub mod manager;
pub mod query;
pub mod scorer;
pub mod snapshot;
pub mod tokenizer;

use std::sync::Arc;
use strata_core::{QueryOf, SnapshotLeaseManager};

// Re-export commonly used types
pub use config::{ScorerKind, SearchConfig, CONFIG_FILE_NAME};
pub use cursor::{CursorBuilder, CursorState, CursorStats, PaginatedCursor, DEFAULT_MAX_PAGE_SIZE};
pub use error::IndexError;
pub use index::{InvertedIndex, PostingEntry, PostingList};
pub use manager::{LeaseStats, PinnedSnapshotManager, SnapshotManager};
pub use query::Query;
pub use scorer::{BM25Scorer, NoIdfScorer, Scorer, ScorerContext, SearchDoc};
pub use snapshot::IndexSnapshot;
pub use tokenizer::{tokenize, tokenize_unique};

// ============================================================================
// Manager Extension
// ============================================================================

/// Extension trait for snapshot lease managers to open cursors
///
/// This trait adds the `.cursor()` method to `Arc<M>` for any
/// [`SnapshotLeaseManager`].
///
/// # Example
///
/// ```ignore
/// use strata_search::CursorExt;
///
/// let mut cursor = manager.cursor(query).sort(sort).limit(50).build();
/// while cursor.has_more()? {
///     let (doc, token) = cursor.take_next()?;
/// }
/// ```
pub trait CursorExt<M: SnapshotLeaseManager> {
    /// Start building a cursor over this manager's snapshots
    fn cursor(&self, query: QueryOf<M>) -> CursorBuilder<M>;
}

impl<M: SnapshotLeaseManager> CursorExt<M> for Arc<M> {
    fn cursor(&self, query: QueryOf<M>) -> CursorBuilder<M> {
        CursorBuilder::new(Arc::clone(self), query)
    }
}
