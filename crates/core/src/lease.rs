//! Scoped snapshot leases
//!
//! A [`SnapshotLease`] ties one acquire/release pair to a Rust scope: the
//! snapshot is handed back to its manager when the lease is dropped, on
//! every exit path including `?` returns and panics.

use crate::error::{Error, Result};
use crate::traits::SnapshotLeaseManager;
use std::ops::Deref;

/// Leased snapshot, released on drop
///
/// # Example
///
/// ```ignore
/// let lease = SnapshotLease::acquire(&manager)?;
/// let page = lease.search_after(&query, None, None, 10)?;
/// // released here
/// ```
pub struct SnapshotLease<'a, M: SnapshotLeaseManager + ?Sized> {
    manager: &'a M,
    snapshot: Option<M::Snapshot>,
}

impl<'a, M: SnapshotLeaseManager + ?Sized> SnapshotLease<'a, M> {
    /// Acquire a snapshot from `manager`
    ///
    /// # Errors
    ///
    /// Returns [`Error::LeaseAcquisition`] if the manager cannot produce one.
    /// Nothing needs releasing in that case.
    pub fn acquire(manager: &'a M) -> Result<Self> {
        let snapshot = manager.acquire().map_err(Error::lease_acquisition)?;
        Ok(SnapshotLease {
            manager,
            snapshot: Some(snapshot),
        })
    }

    /// Release now instead of at end of scope
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.manager.release(snapshot);
        }
    }
}

impl<M: SnapshotLeaseManager + ?Sized> Deref for SnapshotLease<'_, M> {
    type Target = M::Snapshot;

    fn deref(&self) -> &Self::Target {
        // Only `release_inner` takes the snapshot, and it consumes or drops self.
        match &self.snapshot {
            Some(snapshot) => snapshot,
            None => unreachable!("snapshot lease used after release"),
        }
    }
}

impl<M: SnapshotLeaseManager + ?Sized> Drop for SnapshotLease<'_, M> {
    fn drop(&mut self) {
        self.release_inner();
    }
}
