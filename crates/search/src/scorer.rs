//! Scoring infrastructure
//!
//! This module provides:
//! - Scorer trait for pluggable term weighting
//! - ScorerContext for corpus-level statistics
//! - SearchDoc ephemeral document view for ad-hoc scoring
//! - BM25Scorer default, rarity-sensitive implementation
//! - NoIdfScorer, which neutralizes document-frequency weighting
//!
//! A term's contribution to a document's score is `idf * tf`, where `idf`
//! depends only on corpus statistics and `tf` only on the document.

use crate::tokenizer::{tokenize, tokenize_unique};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// SearchDoc
// ============================================================================

/// Ephemeral view of a document for scoring outside an index
#[derive(Debug, Clone)]
pub struct SearchDoc {
    /// Searchable text
    pub body: String,
}

impl SearchDoc {
    /// Create a new SearchDoc with body text
    pub fn new(body: impl Into<String>) -> Self {
        SearchDoc { body: body.into() }
    }
}

// ============================================================================
// ScorerContext
// ============================================================================

/// Corpus-level statistics a scorer may consult
#[derive(Debug, Clone, Default)]
pub struct ScorerContext {
    /// Total documents in corpus
    pub total_docs: u64,

    /// Document frequency per term
    pub doc_freqs: HashMap<String, u64>,

    /// Average document length in tokens
    pub avg_doc_len: f32,
}

impl ScorerContext {
    /// Create a new ScorerContext
    pub fn new(total_docs: u64) -> Self {
        ScorerContext {
            total_docs,
            ..Default::default()
        }
    }

    /// Document frequency of a term (0 if unknown)
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Add document frequency for a term
    pub fn add_doc_freq(&mut self, term: &str, count: u64) {
        self.doc_freqs.insert(term.to_string(), count);
    }

    /// Builder: set average document length
    pub fn with_avg_doc_len(mut self, len: f32) -> Self {
        self.avg_doc_len = len;
        self
    }
}

// ============================================================================
// Scorer Trait
// ============================================================================

/// Pluggable scoring interface
///
/// Higher scores indicate more relevant documents. Scores are not
/// normalized.
///
/// # Thread Safety
///
/// Scorers are shared by every query against an index, so they must be
/// Send + Sync and hold no mutable state.
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Rarity weight of a term found in `doc_freq` of `num_docs` documents
    fn idf(&self, doc_freq: u64, num_docs: u64) -> f32;

    /// Weight of a term occurring `freq` times in a document of `doc_len` tokens
    fn tf(&self, freq: u32, doc_len: u32, avg_doc_len: f32) -> f32;

    /// Name for debugging and logging
    fn name(&self) -> &str;

    /// Contribution of one term to one document's score
    fn score_term(
        &self,
        freq: u32,
        doc_len: u32,
        avg_doc_len: f32,
        doc_freq: u64,
        num_docs: u64,
    ) -> f32 {
        if freq == 0 {
            return 0.0;
        }
        self.idf(doc_freq, num_docs) * self.tf(freq, doc_len, avg_doc_len)
    }

    /// Score free text against a query using the given corpus statistics
    fn score(&self, doc: &SearchDoc, query: &str, ctx: &ScorerContext) -> f32 {
        let doc_terms = tokenize(&doc.body);
        if doc_terms.is_empty() {
            return 0.0;
        }
        let doc_len = doc_terms.len() as u32;

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for term in &doc_terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }

        tokenize_unique(query)
            .iter()
            .map(|term| {
                let freq = counts.get(term.as_str()).copied().unwrap_or(0);
                self.score_term(
                    freq,
                    doc_len,
                    ctx.avg_doc_len,
                    ctx.doc_freq(term),
                    ctx.total_docs,
                )
            })
            .sum()
    }
}

// ============================================================================
// BM25Scorer
// ============================================================================

/// Okapi BM25 term weighting
///
/// For each query term t:
/// score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
///
/// Where:
/// - IDF(t) = ln(1 + (N - df + 0.5) / (df + 0.5))
/// - tf = term frequency in document
/// - dl = document length, avgdl = average document length
/// - k1 = term saturation parameter (default 1.2)
/// - b = length normalization parameter (default 0.75)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BM25Scorer {
    /// k1 parameter: term frequency saturation
    pub(crate) k1: f32,
    /// b parameter: length normalization
    pub(crate) b: f32,
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer { k1: 1.2, b: 0.75 }
    }
}

impl BM25Scorer {
    /// Create a new BM25Scorer with custom parameters
    pub fn new(k1: f32, b: f32) -> Self {
        BM25Scorer { k1, b }
    }
}

impl Scorer for BM25Scorer {
    fn idf(&self, doc_freq: u64, num_docs: u64) -> f32 {
        let df = doc_freq as f32;
        let n = (num_docs.max(doc_freq)) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn tf(&self, freq: u32, doc_len: u32, avg_doc_len: f32) -> f32 {
        let freq = freq as f32;
        let avg_len = avg_doc_len.max(1.0);
        (freq * (self.k1 + 1.0))
            / (freq + self.k1 * (1.0 - self.b + self.b * doc_len as f32 / avg_len))
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

// ============================================================================
// NoIdfScorer
// ============================================================================

/// BM25 with document-frequency weighting switched off
///
/// Every term gets the neutral rarity weight `1.0`, so two documents with
/// the same term frequencies score the same no matter how common those
/// terms are across the corpus. Suited to structured records with a small
/// vocabulary, where rarity says nothing about relevance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoIdfScorer {
    inner: BM25Scorer,
}

impl NoIdfScorer {
    /// Create a NoIdfScorer with custom BM25 saturation parameters
    pub fn new(k1: f32, b: f32) -> Self {
        NoIdfScorer {
            inner: BM25Scorer::new(k1, b),
        }
    }
}

impl Scorer for NoIdfScorer {
    fn idf(&self, _doc_freq: u64, _num_docs: u64) -> f32 {
        1.0
    }

    fn tf(&self, freq: u32, doc_len: u32, avg_doc_len: f32) -> f32 {
        self.inner.tf(freq, doc_len, avg_doc_len)
    }

    fn name(&self) -> &str {
        "no-idf"
    }
}

// ============================================================================
// Tests
// ============================================================================
