//! Error types for Strata search cursors
//!
//! This module defines the error taxonomy surfaced by cursors and their
//! collaborators. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! Collaborators (index snapshots, lease managers) report failures as
//! [`BoxError`]; the cursor wraps them with the query/sort context that
//! triggered the failure.

use std::fmt;
use std::io;
use thiserror::Error;

/// Boxed error produced by index collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Strata search cursors
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying search, sort resolution, or document load failed
    #[error("Search failed for query {query} with sort {sort}: {source}")]
    SearchExecution {
        /// Debug rendering of the query that failed
        query: String,
        /// Debug rendering of the sort in effect (or "relevance")
        sort: String,
        /// Original cause reported by the index
        #[source]
        source: BoxError,
    },

    /// Acquiring an index snapshot failed
    #[error("Failed to acquire index snapshot: {source}")]
    LeaseAcquisition {
        /// Original cause reported by the lease manager
        #[source]
        source: BoxError,
    },

    /// `take_next()` was called on a cursor with no more results
    #[error("Iterator exhausted: no more documents")]
    ExhaustedIterator,

    /// Caller supplied invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error (config files, etc.)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Coarse classification of [`Error`] for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::SearchExecution`]
    SearchExecution,
    /// See [`Error::LeaseAcquisition`]
    LeaseAcquisition,
    /// See [`Error::ExhaustedIterator`]
    ExhaustedIterator,
    /// See [`Error::InvalidInput`]
    InvalidInput,
    /// See [`Error::SerializationError`]
    Serialization,
    /// See [`Error::IoError`]
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SearchExecution => "search_execution",
            ErrorKind::LeaseAcquisition => "lease_acquisition",
            ErrorKind::ExhaustedIterator => "exhausted_iterator",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Wrap a collaborator failure with the query and sort that triggered it
    pub fn search_execution(
        query: &dyn fmt::Debug,
        sort: Option<&dyn fmt::Debug>,
        source: BoxError,
    ) -> Self {
        Error::SearchExecution {
            query: format!("{:?}", query),
            sort: sort.map_or_else(|| "relevance".to_string(), |s| format!("{:?}", s)),
            source,
        }
    }

    /// Wrap a lease manager failure
    pub fn lease_acquisition(source: BoxError) -> Self {
        Error::LeaseAcquisition { source }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Classify this error
    ///
    /// A `SearchExecution` caused by a failed lease reports
    /// [`ErrorKind::LeaseAcquisition`], so lease and search failures stay
    /// distinguishable after the cursor wraps them.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SearchExecution { source, .. } => match source.downcast_ref::<Error>() {
                Some(Error::LeaseAcquisition { .. }) => ErrorKind::LeaseAcquisition,
                _ => ErrorKind::SearchExecution,
            },
            Error::LeaseAcquisition { .. } => ErrorKind::LeaseAcquisition,
            Error::ExhaustedIterator => ErrorKind::ExhaustedIterator,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::SerializationError(_) => ErrorKind::Serialization,
            Error::IoError(_) => ErrorKind::Io,
        }
    }

    /// Whether the same call may succeed if the caller tries again
    ///
    /// Search and lease failures leave the cursor untouched, so a retry is
    /// meaningful. Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::SearchExecution { .. } | Error::LeaseAcquisition { .. }
        )
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
