//! Consistency Tests
//!
//! What a cursor observes when the index changes between its pages:
//! - Snapshot-per-batch: each page reflects the latest version
//! - Snapshot-per-cursor: a pinned view ignores later writes
//! - Leases stay balanced with concurrent readers and a writer

use crate::common::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use stratacursor::{
    CursorExt, DocId, ErrorKind, PinnedSnapshotManager, Query, SnapshotManager,
};

// ============================================================================
// Snapshot-per-batch
// ============================================================================

#[test]
fn latest_manager_sees_appends_past_resume_point() {
    init_tracing();
    let index = corpus_index(10);
    let manager = Arc::new(SnapshotManager::new(Arc::clone(&index)));
    let mut cursor = manager.cursor(Query::MatchAll).limit(3).build();

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(cursor.take_next().unwrap().1.doc);
    }
    for i in 10..15 {
        index.add_document(corpus_doc(i)).unwrap();
    }
    seen.extend(drain_ids(cursor));

    let expected: Vec<_> = (0..15).map(DocId).collect();
    assert_eq!(seen, expected);
}

#[test]
fn latest_manager_skips_deleted_documents_not_yet_reached() {
    let index = corpus_index(10);
    let manager = Arc::new(SnapshotManager::new(Arc::clone(&index)));
    let mut cursor = manager.cursor(Query::MatchAll).limit(2).build();

    let first = cursor.take_next().unwrap().1.doc;
    let second = cursor.take_next().unwrap().1.doc;
    let third = cursor.take_next().unwrap().1.doc;
    // buffer drained; the next page comes from a newer version
    assert!(cursor.needs_fetch());
    assert!(index.delete_document(DocId(5)).unwrap());

    let mut seen = vec![first, second, third];
    seen.extend(drain_ids(cursor));
    assert!(!seen.contains(&DocId(5)));
    assert_eq!(seen.len(), 9);
}

#[test]
fn closed_index_fails_fetch_without_leaking() {
    let index = corpus_index(5);
    let manager = Arc::new(SnapshotManager::new(Arc::clone(&index)));
    let mut cursor = manager.cursor(Query::MatchAll).limit(2).build();
    cursor.take_next().unwrap();
    cursor.take_next().unwrap();
    cursor.take_next().unwrap();

    index.close();
    let err = cursor.has_more().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SearchExecution);
    assert!(err.to_string().contains("closed"));
    assert_eq!(manager.lease_stats().outstanding(), 0);
}

// ============================================================================
// Snapshot-per-cursor
// ============================================================================

#[test]
fn pinned_manager_ignores_writes_between_pages() {
    let index = corpus_index(10);
    let manager = Arc::new(PinnedSnapshotManager::pin(&index).unwrap());
    let mut cursor = manager.cursor(Query::MatchAll).limit(3).build();

    let mut seen = vec![cursor.take_next().unwrap().1.doc];
    for i in 10..20 {
        index.add_document(corpus_doc(i)).unwrap();
    }
    index.delete_document(DocId(7)).unwrap();
    seen.extend(drain_ids(cursor));

    let expected: Vec<_> = (0..10).map(DocId).collect();
    assert_eq!(seen, expected);
    let leases = manager.lease_stats();
    assert_eq!(leases.acquired, leases.released);
}

#[test]
fn pinned_and_latest_agree_on_static_index() {
    let index = corpus_index(30);
    let pinned = Arc::new(PinnedSnapshotManager::pin(&index).unwrap());
    let latest = Arc::new(SnapshotManager::new(Arc::clone(&index)));
    let query = Query::term("body", "alpha beta");

    let a = drain_ids(pinned.cursor(query.clone()).limit(4).build());
    let b = drain_ids(latest.cursor(query).limit(4).build());
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

// ============================================================================
// Concurrent readers and writer
// ============================================================================

#[test]
fn concurrent_cursors_with_writer() {
    let index = corpus_index(100);
    let manager = Arc::new(SnapshotManager::new(Arc::clone(&index)));
    let stop = Arc::new(AtomicBool::new(false));
    let results: Arc<Mutex<Vec<Vec<DocId>>>> = Arc::new(Mutex::new(Vec::new()));

    let writer = {
        let index = Arc::clone(&index);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut i = 100;
            while !stop.load(Ordering::Acquire) && i < 400 {
                index.add_document(corpus_doc(i)).unwrap();
                i += 1;
            }
        })
    };

    let readers: Vec<_> = (0..4usize)
        .map(|r| {
            let manager = Arc::clone(&manager);
            let results = Arc::clone(&results);
            thread::spawn(move || {
                let ids = drain_ids(manager.cursor(Query::MatchAll).limit(5 + r).build());
                results.lock().push(ids);
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    writer.join().unwrap();

    let results = results.lock();
    assert_eq!(results.len(), 4);
    for ids in results.iter() {
        // appends land after the resume point, so nothing repeats or reorders
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.len() >= 100);
        assert_eq!(&ids[..100], &(0..100).map(DocId).collect::<Vec<_>>()[..]);
    }

    let leases = manager.lease_stats();
    assert_eq!(leases.acquired, leases.released);
    assert!(manager.leased_generations().is_empty());
}
