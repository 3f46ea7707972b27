//! Errors raised by the in-memory index
//!
//! These reach cursor callers as the `source` of
//! [`strata_core::Error::SearchExecution`] or
//! [`strata_core::Error::LeaseAcquisition`].

use strata_core::{DocId, SortKind};
use thiserror::Error;

/// Index-level failures
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// The index was closed; no new snapshots can be leased
    #[error("Index is closed")]
    Closed,

    /// Sort binds a field to a type the index does not store for it
    #[error("Sort field '{field}' holds {actual:?} values, sort requested {requested:?}")]
    SortKindMismatch {
        /// Field name
        field: String,
        /// Kind requested by the sort
        requested: SortKind,
        /// Kind stored in the index
        actual: SortKind,
    },

    /// A sort was passed to `search_after` without being resolved first
    #[error("Sort must be resolved against a snapshot before searching")]
    UnresolvedSort,

    /// Resume token was produced under a different sort
    #[error("Resume token carries {actual} sort values, sort has {expected} fields")]
    TokenSortMismatch {
        /// Number of sort fields
        expected: usize,
        /// Number of values in the token
        actual: usize,
    },

    /// A document stores a field with a different type than earlier documents
    #[error("Field '{field}' holds {existing:?} values, cannot store {got:?}")]
    FieldKindConflict {
        /// Field name
        field: String,
        /// Kind already recorded for the field
        existing: SortKind,
        /// Kind of the rejected value
        got: SortKind,
    },

    /// Document is not visible in the snapshot
    #[error("Document not found: {0}")]
    DocumentNotFound(DocId),
}
