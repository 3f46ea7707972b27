//! Read-only index views
//!
//! An [`IndexSnapshot`] wraps one published [`IndexState`] and implements
//! [`Searcher`]. Creating one is O(1): it only clones two `Arc`s.
//!
//! # Ordering
//!
//! - Relevance (no sort): score descending, then DocId ascending
//! - Sorted: each sort field in turn, then DocId ascending
//!
//! Both are total orders, which is what makes "strictly after this token"
//! well defined. Scores depend on the corpus statistics of the snapshot, so
//! a relevance-ordered stream read across several snapshots is only as
//! stable as those statistics.

use crate::error::IndexError;
use crate::index::IndexState;
use crate::query::Query;
use crate::scorer::Scorer;
use crate::tokenizer::tokenize_unique;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{
    BoxError, DocId, Document, FieldSelection, FieldValue, ScoreDoc, Searcher, Sort, SortKind,
    SortTarget, SortValue, TopDocs,
};

/// Immutable view of one index version
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    state: Arc<IndexState>,
    scorer: Arc<dyn Scorer>,
}

impl IndexSnapshot {
    pub(crate) fn new(state: Arc<IndexState>, scorer: Arc<dyn Scorer>) -> Self {
        IndexSnapshot { state, scorer }
    }

    /// Number of documents visible in this view
    pub fn total_docs(&self) -> usize {
        self.state.docs.len()
    }

    /// Number of documents matching `query`
    pub fn count(&self, query: &Query) -> usize {
        self.evaluate(query).len()
    }

    // ========================================================================
    // Query Evaluation
    // ========================================================================

    fn evaluate(&self, query: &Query) -> HashMap<DocId, f32> {
        match query {
            Query::MatchAll => self.match_all(),
            Query::Term { field, text } => self.evaluate_term(field, text),
            Query::Bool {
                must,
                should,
                must_not,
            } => self.evaluate_bool(must, should, must_not),
        }
    }

    fn match_all(&self) -> HashMap<DocId, f32> {
        self.state.docs.keys().map(|doc| (*doc, 1.0)).collect()
    }

    fn evaluate_term(&self, field: &str, text: &str) -> HashMap<DocId, f32> {
        let num_docs = self.state.docs.len() as u64;
        let avg_len = self.state.avg_field_len(field);
        let mut scores: HashMap<DocId, f32> = HashMap::new();

        for term in tokenize_unique(text) {
            let Some(list) = self.state.postings(field, &term) else {
                continue;
            };
            let doc_freq = list.len() as u64;
            for entry in &list.entries {
                let contribution =
                    self.scorer
                        .score_term(entry.tf, entry.doc_len, avg_len, doc_freq, num_docs);
                *scores.entry(entry.doc).or_insert(0.0) += contribution;
            }
        }
        scores
    }

    fn evaluate_bool(
        &self,
        must: &[Query],
        should: &[Query],
        must_not: &[Query],
    ) -> HashMap<DocId, f32> {
        let mut result = match must.split_first() {
            Some((first, rest)) => {
                let mut acc = self.evaluate(first);
                for clause in rest {
                    let scores = self.evaluate(clause);
                    acc.retain(|doc, _| scores.contains_key(doc));
                    for (doc, score) in acc.iter_mut() {
                        *score += scores[doc];
                    }
                }
                for clause in should {
                    for (doc, score) in self.evaluate(clause) {
                        if let Some(acc_score) = acc.get_mut(&doc) {
                            *acc_score += score;
                        }
                    }
                }
                acc
            }
            None if should.is_empty() => self.match_all(),
            None => {
                let mut acc: HashMap<DocId, f32> = HashMap::new();
                for clause in should {
                    for (doc, score) in self.evaluate(clause) {
                        *acc.entry(doc).or_insert(0.0) += score;
                    }
                }
                acc
            }
        };

        for clause in must_not {
            let excluded = self.evaluate(clause);
            result.retain(|doc, _| !excluded.contains_key(doc));
        }
        result
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    fn sort_values(&self, sort: &Sort, doc: DocId, score: f32) -> Vec<SortValue> {
        let stored = self.state.docs.get(&doc).map(|d| &d.document);
        sort.fields
            .iter()
            .map(|field| match &field.target {
                SortTarget::Score => SortValue::Float(f64::from(score)),
                SortTarget::Doc => SortValue::Doc(doc.as_u64()),
                SortTarget::Field(name) => {
                    match (stored.and_then(|d| d.get(name)), field.kind) {
                        (Some(FieldValue::Int(v)), Some(SortKind::Int)) => SortValue::Int(*v),
                        (Some(FieldValue::Float(v)), Some(SortKind::Float)) => {
                            SortValue::Float(*v)
                        }
                        (Some(FieldValue::Text(v)), Some(SortKind::Text)) => {
                            SortValue::Text(v.clone())
                        }
                        _ => SortValue::Missing,
                    }
                }
            })
            .collect()
    }
}

/// Total order of results under `sort` (relevance when `None`)
pub(crate) fn compare(sort: Option<&Sort>, a: &ScoreDoc, b: &ScoreDoc) -> Ordering {
    let Some(sort) = sort else {
        return b.score.total_cmp(&a.score).then_with(|| a.doc.cmp(&b.doc));
    };

    for (i, field) in sort.fields.iter().enumerate() {
        let va = a.fields.get(i).unwrap_or(&SortValue::Missing);
        let vb = b.fields.get(i).unwrap_or(&SortValue::Missing);
        let mut ord = va.cmp(vb);
        // score sorts best-first by default
        if field.target == SortTarget::Score {
            ord = ord.reverse();
        }
        if field.reverse {
            ord = ord.reverse();
        }
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.doc.cmp(&b.doc)
}

impl Searcher for IndexSnapshot {
    type Query = Query;

    fn generation(&self) -> u64 {
        self.state.version
    }

    fn resolve_sort(&self, sort: &Sort) -> Result<Sort, BoxError> {
        let mut resolved = sort.clone();
        for field in &mut resolved.fields {
            let SortTarget::Field(name) = &field.target else {
                continue;
            };
            match (self.state.field_kinds.get(name), field.kind) {
                (Some(actual), Some(requested)) if *actual != requested => {
                    return Err(Box::new(IndexError::SortKindMismatch {
                        field: name.clone(),
                        requested,
                        actual: *actual,
                    }));
                }
                (Some(actual), _) => field.kind = Some(*actual),
                // explicitly typed fields may legitimately be absent so far
                (None, Some(_)) => {}
                // never stored in this view: every document sorts as Missing
                // under any kind, and a later generation rebinds it
                (None, None) => field.kind = Some(SortKind::Int),
            }
        }
        Ok(resolved)
    }

    fn search_after(
        &self,
        query: &Query,
        sort: Option<&Sort>,
        after: Option<&ScoreDoc>,
        n: usize,
    ) -> Result<TopDocs, BoxError> {
        if let Some(sort) = sort {
            if !sort.is_resolved() {
                return Err(Box::new(IndexError::UnresolvedSort));
            }
            if let Some(after) = after {
                if after.fields.len() != sort.fields.len() {
                    return Err(Box::new(IndexError::TokenSortMismatch {
                        expected: sort.fields.len(),
                        actual: after.fields.len(),
                    }));
                }
            }
        }

        let matches = self.evaluate(query);
        let total_hits = matches.len();
        if n == 0 {
            return Ok(TopDocs {
                total_hits,
                score_docs: Vec::new(),
            });
        }

        let mut score_docs: Vec<ScoreDoc> = matches
            .into_iter()
            .map(|(doc, score)| {
                let token = ScoreDoc::new(doc, score);
                match sort {
                    Some(sort) => token.with_fields(self.sort_values(sort, doc, score)),
                    None => token,
                }
            })
            .filter(|sd| after.map_or(true, |a| compare(sort, sd, a) == Ordering::Greater))
            .collect();

        let cmp = |a: &ScoreDoc, b: &ScoreDoc| compare(sort, a, b);
        if score_docs.len() > n {
            score_docs.select_nth_unstable_by(n, cmp);
            score_docs.truncate(n);
        }
        score_docs.sort_unstable_by(cmp);

        Ok(TopDocs {
            total_hits,
            score_docs,
        })
    }

    fn load_document(&self, doc: DocId, fields: &FieldSelection) -> Result<Document, BoxError> {
        self.state
            .docs
            .get(&doc)
            .map(|stored| stored.document.project(fields))
            .ok_or_else(|| Box::new(IndexError::DocumentNotFound(doc)) as BoxError)
    }
}
