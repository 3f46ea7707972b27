//! In-memory inverted index
//!
//! This module provides:
//! - InvertedIndex, the mutable writer side, with posting lists per field
//! - Copy-on-write publication: every mutation produces a new state version
//! - Version watermark used as the snapshot generation
//!
//! Readers never see a half-applied write: they take an
//! [`IndexSnapshot`](crate::IndexSnapshot) (an `Arc` of one published
//! state) and keep reading it while writers publish newer states.
//!
//! # Known Limitations
//!
//! - **Memory**: a write while snapshots are outstanding clones the state
//! - **Persistence**: none, the index lives in memory only

use crate::config::SearchConfig;
use crate::error::IndexError;
use crate::scorer::{BM25Scorer, Scorer};
use crate::snapshot::IndexSnapshot;
use crate::tokenizer::term_frequencies;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strata_core::{DocId, Document, FieldValue, SortKind};

// ============================================================================
// PostingEntry
// ============================================================================

/// Entry in a posting list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingEntry {
    /// Document containing the term
    pub doc: DocId,
    /// Term frequency in this document's field
    pub tf: u32,
    /// Field length in tokens
    pub doc_len: u32,
}

impl PostingEntry {
    /// Create a new posting entry
    pub fn new(doc: DocId, tf: u32, doc_len: u32) -> Self {
        PostingEntry { doc, tf, doc_len }
    }
}

// ============================================================================
// PostingList
// ============================================================================

/// Documents containing a term, in ascending DocId order
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    /// Document entries
    pub entries: Vec<PostingEntry>,
}

impl PostingList {
    /// Create a new empty posting list
    pub fn new() -> Self {
        PostingList { entries: vec![] }
    }

    /// Add an entry to the posting list
    ///
    /// DocIds are allocated monotonically, so appending keeps the order.
    pub fn add(&mut self, entry: PostingEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry for `doc`, returning how many were removed
    pub fn remove(&mut self, doc: DocId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.doc != doc);
        before - self.entries.len()
    }

    /// Number of documents containing this term
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if posting list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// IndexState
// ============================================================================

/// Token count totals for one text field
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FieldStats {
    pub(crate) total_len: u64,
    pub(crate) doc_count: u64,
}

impl FieldStats {
    pub(crate) fn avg_len(&self) -> f32 {
        if self.doc_count == 0 {
            return 0.0;
        }
        self.total_len as f32 / self.doc_count as f32
    }
}

/// A stored document plus its per-field token counts
#[derive(Debug, Clone)]
pub(crate) struct StoredDoc {
    pub(crate) document: Document,
    pub(crate) field_lens: HashMap<String, u32>,
}

/// One published version of the index
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexState {
    /// Version watermark, incremented on every mutation
    pub(crate) version: u64,
    /// Next DocId to hand out
    pub(crate) next_doc_id: u64,
    pub(crate) docs: BTreeMap<DocId, StoredDoc>,
    /// field -> term -> postings
    pub(crate) postings: HashMap<String, HashMap<String, PostingList>>,
    pub(crate) field_stats: HashMap<String, FieldStats>,
    /// First-seen value type of every stored field
    pub(crate) field_kinds: HashMap<String, SortKind>,
}

impl IndexState {
    pub(crate) fn postings(&self, field: &str, term: &str) -> Option<&PostingList> {
        self.postings.get(field).and_then(|terms| terms.get(term))
    }

    pub(crate) fn avg_field_len(&self, field: &str) -> f32 {
        self.field_stats
            .get(field)
            .map(FieldStats::avg_len)
            .unwrap_or(0.0)
    }

    fn check_kinds(&self, document: &Document) -> Result<(), IndexError> {
        for (name, value) in &document.fields {
            if let Some(existing) = self.field_kinds.get(name) {
                if *existing != value.sort_kind() {
                    return Err(IndexError::FieldKindConflict {
                        field: name.clone(),
                        existing: *existing,
                        got: value.sort_kind(),
                    });
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, document: Document) -> DocId {
        let doc = DocId(self.next_doc_id);
        self.next_doc_id += 1;

        let mut field_lens = HashMap::new();
        for (name, value) in &document.fields {
            self.field_kinds
                .entry(name.clone())
                .or_insert_with(|| value.sort_kind());

            let FieldValue::Text(text) = value else {
                continue;
            };
            let (freqs, len) = term_frequencies(text);
            let terms = self.postings.entry(name.clone()).or_default();
            for (term, tf) in freqs {
                terms.entry(term).or_default().add(PostingEntry::new(doc, tf, len));
            }
            let stats = self.field_stats.entry(name.clone()).or_default();
            stats.total_len += u64::from(len);
            stats.doc_count += 1;
            field_lens.insert(name.clone(), len);
        }

        self.docs.insert(
            doc,
            StoredDoc {
                document,
                field_lens,
            },
        );
        self.version += 1;
        doc
    }

    fn remove(&mut self, doc: DocId) -> bool {
        let Some(stored) = self.docs.remove(&doc) else {
            return false;
        };

        for (name, value) in &stored.document.fields {
            let FieldValue::Text(text) = value else {
                continue;
            };
            let (freqs, _) = term_frequencies(text);
            if let Some(terms) = self.postings.get_mut(name) {
                for term in freqs.keys() {
                    if let Some(list) = terms.get_mut(term) {
                        list.remove(doc);
                        if list.is_empty() {
                            terms.remove(term);
                        }
                    }
                }
            }
            if let Some(stats) = self.field_stats.get_mut(name) {
                let len = stored.field_lens.get(name).copied().unwrap_or(0);
                stats.total_len = stats.total_len.saturating_sub(u64::from(len));
                stats.doc_count = stats.doc_count.saturating_sub(1);
            }
        }

        self.version += 1;
        true
    }
}

// ============================================================================
// InvertedIndex
// ============================================================================

/// Mutable in-memory index
///
/// # Thread Safety
///
/// Writers serialize on a short write lock and publish a new state; readers
/// only clone the current `Arc` under a read lock. Multiple readers and
/// writers are supported.
///
/// # Example
///
/// ```
/// use strata_search::{InvertedIndex, Query};
/// use strata_core::{Document, Searcher};
///
/// let index = InvertedIndex::new();
/// index.add_document(Document::new().with_field("name", "Jane Smith")).unwrap();
///
/// let snapshot = index.snapshot().unwrap();
/// let page = snapshot.search_after(&Query::term("name", "smith"), None, None, 10).unwrap();
/// assert_eq!(page.total_hits, 1);
/// ```
#[derive(Debug)]
pub struct InvertedIndex {
    state: RwLock<Arc<IndexState>>,
    scorer: Arc<dyn Scorer>,
    closed: AtomicBool,
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InvertedIndex {
    /// Create an empty index scored with BM25
    pub fn new() -> Self {
        Self::with_scorer(Arc::new(BM25Scorer::default()))
    }

    /// Create an empty index with a custom scorer
    pub fn with_scorer(scorer: Arc<dyn Scorer>) -> Self {
        InvertedIndex {
            state: RwLock::new(Arc::new(IndexState::default())),
            scorer,
            closed: AtomicBool::new(false),
        }
    }

    /// Create an empty index using the scorer named in `config`
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::with_scorer(config.build_scorer())
    }

    /// Scorer applied to every query
    pub fn scorer(&self) -> &Arc<dyn Scorer> {
        &self.scorer
    }

    // ========================================================================
    // Index Updates
    // ========================================================================

    /// Add a document, returning its new id
    ///
    /// Text fields are tokenized and become searchable; numeric fields are
    /// stored and sortable only.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::FieldKindConflict`] if a field's value type
    /// differs from the type earlier documents stored under that name, and
    /// [`IndexError::Closed`] after [`InvertedIndex::close`]. The index is
    /// unchanged on error.
    pub fn add_document(&self, document: Document) -> Result<DocId, IndexError> {
        self.ensure_open()?;
        let mut guard = self.state.write();
        guard.check_kinds(&document)?;
        Ok(Arc::make_mut(&mut guard).insert(document))
    }

    /// Delete a document
    ///
    /// Returns false if the document was not present. Snapshots taken before
    /// the delete still see it.
    pub fn delete_document(&self, doc: DocId) -> Result<bool, IndexError> {
        self.ensure_open()?;
        let mut guard = self.state.write();
        if !guard.docs.contains_key(&doc) {
            return Ok(false);
        }
        Ok(Arc::make_mut(&mut guard).remove(doc))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current version watermark
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Number of live documents
    pub fn total_docs(&self) -> usize {
        self.state.read().docs.len()
    }

    /// Number of documents whose `field` contains `term`
    pub fn doc_freq(&self, field: &str, term: &str) -> usize {
        self.state
            .read()
            .postings(field, term)
            .map_or(0, PostingList::len)
    }

    /// Average token count of `field` over documents that have it
    pub fn avg_field_len(&self, field: &str) -> f32 {
        self.state.read().avg_field_len(field)
    }

    /// Read-only view of the current version
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Closed`] after [`InvertedIndex::close`].
    pub fn snapshot(&self) -> Result<IndexSnapshot, IndexError> {
        self.ensure_open()?;
        let state = Arc::clone(&self.state.read());
        Ok(IndexSnapshot::new(state, Arc::clone(&self.scorer)))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Refuse further writes and snapshots
    ///
    /// Snapshots already handed out stay readable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`InvertedIndex::close`] was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), IndexError> {
        if self.is_closed() {
            return Err(IndexError::Closed);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
