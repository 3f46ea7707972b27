//! StrataCursor - Resumable, paginated search over a concurrently updated index
//!
//! Streams query results page by page without materializing the full result
//! set or paying for offset pagination. Each page is read from a leased
//! index snapshot that is handed back before the page reaches the caller.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use stratacursor::{CursorExt, Document, InvertedIndex, Query, SnapshotManager};
//!
//! let index = Arc::new(InvertedIndex::new());
//! index.add_document(Document::new().with_field("title", "rust cursors")).unwrap();
//! let manager = Arc::new(SnapshotManager::new(index));
//!
//! let mut cursor = manager.cursor(Query::term("title", "rust")).limit(20).build();
//! while cursor.has_more().unwrap() {
//!     let (doc, token) = cursor.take_next().unwrap();
//!     // `token.encode()` can be handed to a client to resume later
//!     let _ = (doc, token);
//! }
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: result tokens, sorts, documents, errors, and the
//!   collaborator traits a cursor consumes
//! - `strata-search`: the cursor itself, scoring, and an in-memory index
//!   implementing those traits

pub use strata_core::{
    BoxError, DocId, Document, Error, ErrorKind, FieldSelection, FieldValue, Hit, Limit, QueryOf,
    Result, ScoreDoc, Searcher, SnapshotLease, SnapshotLeaseManager, Sort, SortField, SortKind,
    SortTarget, SortValue, TopDocs,
};
pub use strata_search::{
    BM25Scorer, CursorBuilder, CursorExt, CursorState, CursorStats, IndexError, IndexSnapshot,
    InvertedIndex, LeaseStats, NoIdfScorer, PaginatedCursor, PinnedSnapshotManager, Query,
    Scorer, ScorerContext, ScorerKind, SearchConfig, SnapshotManager, CONFIG_FILE_NAME,
    DEFAULT_MAX_PAGE_SIZE,
};
