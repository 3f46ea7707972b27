//! Core types and traits for Strata search cursors
//!
//! This crate defines the foundational types used throughout the system:
//! - DocId / ScoreDoc: Stable document ids and resumable result tokens
//! - Sort / SortField: Sort specifications resolved per snapshot
//! - Document / FieldSelection: Stored fields and projections
//! - TopDocs / Limit: Pages and page size requests
//! - Error: Error type hierarchy
//! - Traits: Collaborator contracts (Searcher, SnapshotLeaseManager)
//! - SnapshotLease: Scoped acquire/release of index snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lease;
pub mod search_types;
pub mod traits;

// Re-export commonly used types and traits
pub use error::{BoxError, Error, ErrorKind, Result};
pub use lease::SnapshotLease;
pub use search_types::{
    DocId, Document, FieldSelection, FieldValue, Hit, Limit, ScoreDoc, Sort, SortField, SortKind,
    SortTarget, SortValue, TopDocs,
};
pub use traits::{QueryOf, Searcher, SnapshotLeaseManager};
