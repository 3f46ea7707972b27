//! Snapshot lease managers for the in-memory index
//!
//! - [`SnapshotManager`]: every acquire leases the latest published version
//!   (snapshot-per-batch when used by a cursor)
//! - [`PinnedSnapshotManager`]: every acquire leases the same pinned
//!   version (snapshot-per-cursor)
//!
//! Both keep acquire/release counters and the number of outstanding leases
//! per generation, so unbalanced use is visible.

use crate::error::IndexError;
use crate::index::InvertedIndex;
use crate::snapshot::IndexSnapshot;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use strata_core::{BoxError, SnapshotLeaseManager, Searcher};
use tracing::{trace, warn};

// ============================================================================
// LeaseStats
// ============================================================================

/// Point-in-time lease counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeaseStats {
    /// Successful acquires
    pub acquired: u64,
    /// Releases
    pub released: u64,
}

impl LeaseStats {
    /// Leases acquired but not yet released
    pub fn outstanding(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// Shared bookkeeping for both managers
#[derive(Debug, Default)]
struct LeaseTracker {
    acquired: AtomicU64,
    released: AtomicU64,
    /// generation -> outstanding leases
    outstanding: DashMap<u64, u64>,
}

impl LeaseTracker {
    fn on_acquire(&self, generation: u64) {
        self.acquired.fetch_add(1, Ordering::AcqRel);
        *self.outstanding.entry(generation).or_insert(0) += 1;
        trace!(generation, "Snapshot leased");
    }

    fn on_release(&self, generation: u64) {
        self.released.fetch_add(1, Ordering::AcqRel);
        let now_unused = match self.outstanding.get_mut(&generation) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => {
                warn!(generation, "Released a snapshot that was never leased");
                false
            }
        };
        if now_unused {
            self.outstanding.remove_if(&generation, |_, count| *count == 0);
        }
        trace!(generation, "Snapshot released");
    }

    fn stats(&self) -> LeaseStats {
        LeaseStats {
            acquired: self.acquired.load(Ordering::Acquire),
            released: self.released.load(Ordering::Acquire),
        }
    }

    fn generations(&self) -> Vec<u64> {
        let mut generations: Vec<u64> = self.outstanding.iter().map(|e| *e.key()).collect();
        generations.sort_unstable();
        generations
    }
}

// ============================================================================
// SnapshotManager
// ============================================================================

/// Leases the latest version of an [`InvertedIndex`] on every acquire
///
/// A cursor reading through this manager sees each page from whatever
/// version was current when the page was fetched. Writes that land between
/// pages can therefore shift documents across the resume point: a document
/// inserted before the point is never seen, and relevance scores may drift
/// as corpus statistics change. Use [`PinnedSnapshotManager`] when a single
/// consistent view for the whole stream matters more than freshness.
#[derive(Debug)]
pub struct SnapshotManager {
    index: Arc<InvertedIndex>,
    tracker: LeaseTracker,
}

impl SnapshotManager {
    /// Create a manager over `index`
    pub fn new(index: Arc<InvertedIndex>) -> Self {
        SnapshotManager {
            index,
            tracker: LeaseTracker::default(),
        }
    }

    /// The managed index
    pub fn index(&self) -> &Arc<InvertedIndex> {
        &self.index
    }

    /// Acquire/release counters
    pub fn lease_stats(&self) -> LeaseStats {
        self.tracker.stats()
    }

    /// Generations that currently have outstanding leases, ascending
    pub fn leased_generations(&self) -> Vec<u64> {
        self.tracker.generations()
    }
}

impl SnapshotLeaseManager for SnapshotManager {
    type Snapshot = IndexSnapshot;

    fn acquire(&self) -> Result<IndexSnapshot, BoxError> {
        let snapshot = self.index.snapshot()?;
        self.tracker.on_acquire(snapshot.generation());
        Ok(snapshot)
    }

    fn release(&self, snapshot: IndexSnapshot) {
        self.tracker.on_release(snapshot.generation());
    }
}

// ============================================================================
// PinnedSnapshotManager
// ============================================================================

/// Leases one fixed version on every acquire
///
/// Gives a cursor snapshot-per-cursor consistency: every page is read from
/// the same view, so concurrent writes can neither skip nor repeat results.
/// The pinned version stays in memory for as long as this manager lives.
#[derive(Debug)]
pub struct PinnedSnapshotManager {
    snapshot: IndexSnapshot,
    tracker: LeaseTracker,
}

impl PinnedSnapshotManager {
    /// Pin the current version of `index`
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Closed`] if the index is closed.
    pub fn pin(index: &InvertedIndex) -> Result<Self, IndexError> {
        Ok(PinnedSnapshotManager {
            snapshot: index.snapshot()?,
            tracker: LeaseTracker::default(),
        })
    }

    /// Generation of the pinned view
    pub fn generation(&self) -> u64 {
        self.snapshot.generation()
    }

    /// Acquire/release counters
    pub fn lease_stats(&self) -> LeaseStats {
        self.tracker.stats()
    }
}

impl SnapshotLeaseManager for PinnedSnapshotManager {
    type Snapshot = IndexSnapshot;

    fn acquire(&self) -> Result<IndexSnapshot, BoxError> {
        self.tracker.on_acquire(self.snapshot.generation());
        Ok(self.snapshot.clone())
    }

    fn release(&self, snapshot: IndexSnapshot) {
        self.tracker.on_release(snapshot.generation());
    }
}
