//! Scoring Tests
//!
//! Relevance order seen through a cursor under each scoring strategy, and
//! index/cursor setup from `search.toml`.

use crate::common::*;
use std::sync::Arc;
use stratacursor::{
    CursorExt, Document, InvertedIndex, PaginatedCursor, Query, ScorerKind, SearchConfig,
    SnapshotManager, CONFIG_FILE_NAME,
};
use tempfile::TempDir;

/// "repeated" has the common term twice, "unique" holds the only rare term
fn rarity_corpus(index: &InvertedIndex) {
    let docs = [
        ("repeated", "common common filler"),
        ("unique", "rare filler filler"),
        ("plain1", "common filler filler"),
        ("plain2", "common filler filler"),
        ("plain3", "common filler filler"),
    ];
    for (title, body) in docs {
        index
            .add_document(
                Document::new()
                    .with_field("title", title)
                    .with_field("body", body),
            )
            .unwrap();
    }
}

fn top_title(index: Arc<InvertedIndex>) -> String {
    let manager = Arc::new(SnapshotManager::new(index));
    let mut cursor = manager.cursor(Query::term("body", "common rare")).limit(1).build();
    let (doc, _) = cursor.take_next().unwrap();
    doc.get_text("title").unwrap().to_string()
}

#[test]
fn bm25_favors_rare_terms() {
    let index = Arc::new(InvertedIndex::new());
    rarity_corpus(&index);
    assert_eq!(top_title(index), "unique");
}

#[test]
fn no_idf_favors_term_frequency() {
    let config = SearchConfig {
        scorer: ScorerKind::NoIdf,
        ..Default::default()
    };
    let index = Arc::new(InvertedIndex::from_config(&config));
    rarity_corpus(&index);
    assert_eq!(top_title(index), "repeated");
}

#[test]
fn config_file_drives_index_and_cursor() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "max_page_size = 4\nscorer = \"no-idf\"\n").unwrap();

    let config = SearchConfig::from_file(&path).unwrap();
    let index = Arc::new(InvertedIndex::from_config(&config));
    assert_eq!(index.scorer().name(), "no-idf");
    for i in 0..10 {
        index.add_document(corpus_doc(i)).unwrap();
    }

    let manager = Arc::new(SnapshotManager::new(index));
    let mut cursor = PaginatedCursor::new(
        Arc::clone(&manager),
        Query::MatchAll,
        None,
        None,
        100,
        Default::default(),
    )
    .with_config(&config);
    assert_eq!(cursor.batch_size(), 5);

    let mut count = 0;
    while cursor.has_more().unwrap() {
        cursor.take_next().unwrap();
        count += 1;
    }
    assert_eq!(count, 10);
    // 5 + 5 + empty fetch
    assert_eq!(cursor.stats().fetches, 3);
}
