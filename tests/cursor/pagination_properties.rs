//! Pagination Property Tests
//!
//! For a static index, reading a stream in pages of any size yields the
//! same sequence as reading it in one go.

use crate::common::*;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use stratacursor::{CursorExt, DocId, Limit, Query, SnapshotManager, Sort, SortField};

fn arb_query() -> impl Strategy<Value = Query> {
    prop_oneof![
        Just(Query::MatchAll),
        Just(Query::term("body", "alpha")),
        Just(Query::term("body", "gamma delta")),
        Just(
            Query::boolean()
                .should(Query::term("body", "beta"))
                .must_not(Query::term("body", "sigma")),
        ),
    ]
}

fn arb_sort() -> impl Strategy<Value = Option<Sort>> {
    prop_oneof![
        Just(None),
        Just(Some(Sort::by_field("year"))),
        Just(Some(Sort::new(vec![SortField::field("year").reversed()]))),
        Just(Some(Sort::new(vec![SortField::score(), SortField::field("title")]))),
    ]
}

fn full_stream(manager: &Arc<SnapshotManager>, query: &Query, sort: &Option<Sort>) -> Vec<DocId> {
    let mut builder = manager.cursor(query.clone()).limit(Limit::Unbounded);
    if let Some(sort) = sort {
        builder = builder.sort(sort.clone());
    }
    drain_ids(builder.build())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn paged_cursor_matches_single_pass(
        docs in 0u64..60,
        limit in 1usize..12,
        max_page_size in 1usize..9,
        query in arb_query(),
        sort in arb_sort(),
    ) {
        let manager = Arc::new(SnapshotManager::new(corpus_index(docs)));
        let expected = full_stream(&manager, &query, &sort);

        let mut builder = manager
            .cursor(query.clone())
            .limit(limit)
            .max_page_size(max_page_size);
        if let Some(sort) = &sort {
            builder = builder.sort(sort.clone());
        }
        let paged = drain_ids(builder.build());

        prop_assert_eq!(&paged, &expected);
        let unique: HashSet<_> = paged.iter().collect();
        prop_assert_eq!(unique.len(), paged.len());

        let leases = manager.lease_stats();
        prop_assert_eq!(leases.acquired, leases.released);
    }

    #[test]
    fn resumed_sessions_concatenate_to_full_stream(
        docs in 0u64..40,
        limit in 1usize..8,
        query in arb_query(),
        sort in arb_sort(),
    ) {
        let manager = Arc::new(SnapshotManager::new(corpus_index(docs)));
        let expected = full_stream(&manager, &query, &sort);

        let pages = paged_sessions(&manager, query, sort, limit).unwrap();
        for page in &pages {
            prop_assert!(page.len() <= limit);
        }
        let concatenated: Vec<DocId> = pages
            .iter()
            .flatten()
            .map(|(_, token)| token.doc)
            .collect();
        prop_assert_eq!(concatenated, expected);
    }
}

#[test]
fn exhaustion_is_detected_for_exact_multiples() {
    // 12 matches, page sizes that divide it evenly
    for limit in [1usize, 2, 3, 4, 6, 12] {
        let manager = Arc::new(SnapshotManager::new(corpus_index(12)));
        let mut cursor = manager.cursor(Query::MatchAll).limit(limit).build();
        let mut count = 0;
        while cursor.has_more().unwrap() {
            cursor.take_next().unwrap();
            count += 1;
        }
        assert_eq!(count, 12, "limit {}", limit);
        assert!(!cursor.may_have_more());
        // the sentinel result tells a full page apart from the last one
        let expected_fetches = (12 / (limit + 1) + 1) as u64;
        assert_eq!(cursor.stats().fetches, expected_fetches, "limit {}", limit);
    }
}
