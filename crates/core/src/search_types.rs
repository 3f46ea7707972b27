//! Core search types for paginated retrieval
//!
//! This module defines the types exchanged between a cursor and the index
//! it reads from:
//! - DocId: Stable document identifier assigned by the index
//! - ScoreDoc: Result token, usable as the resumption point of the next page
//! - Sort / SortField: Optional sort specification, resolved per snapshot
//! - Document / FieldValue / FieldSelection: Projected stored fields
//! - TopDocs: One page returned by a single search call
//! - Limit: Requested page size for a cursor

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// DocId
// ============================================================================

/// Stable document identifier
///
/// Assigned by the index on insert and never reused, so a token taken from
/// one snapshot still names the same document in a later snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u64);

impl DocId {
    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

// ============================================================================
// SortValue
// ============================================================================

/// Sort key material captured for one result
///
/// Values of different variants compare by variant rank; `Missing` sorts
/// after every present value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortValue {
    /// Integer field value
    Int(i64),
    /// Floating point field value (also used for scores)
    Float(f64),
    /// Text field value
    Text(String),
    /// Document identifier
    Doc(u64),
    /// Field absent on this document
    Missing,
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Int(_) => 0,
            SortValue::Float(_) => 1,
            SortValue::Text(_) => 2,
            SortValue::Doc(_) => 3,
            SortValue::Missing => 4,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Doc(a), SortValue::Doc(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

// ============================================================================
// ScoreDoc
// ============================================================================

/// Position of one result in a result stream
///
/// Carries everything the index needs to resume strictly after this result:
/// the document id, its relevance score and, when a sort is in effect, the
/// sort values it was ordered by. This is not a row offset, so resuming costs
/// the same no matter how deep into the stream the token points.
///
/// # Examples
///
/// ```
/// use strata_core::{DocId, ScoreDoc};
///
/// let token = ScoreDoc::new(DocId(7), 1.5);
/// let encoded = token.encode().unwrap();
/// assert_eq!(ScoreDoc::decode(&encoded).unwrap(), token);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    /// Document this result refers to
    pub doc: DocId,
    /// Relevance score computed against the snapshot that produced it
    pub score: f32,
    /// Sort values, one per sort field (empty for relevance order)
    pub fields: Vec<SortValue>,
}

impl ScoreDoc {
    /// Create a relevance-ordered result token
    pub fn new(doc: DocId, score: f32) -> Self {
        ScoreDoc {
            doc,
            score,
            fields: Vec::new(),
        }
    }

    /// Builder: attach sort values
    pub fn with_fields(mut self, fields: Vec<SortValue>) -> Self {
        self.fields = fields;
        self
    }

    /// Encode as an opaque, URL-safe token string
    pub fn encode(&self) -> Result<String> {
        let bytes = rmp_serde::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decode a token string produced by [`ScoreDoc::encode`]
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| Error::SerializationError(format!("Invalid token encoding: {}", e)))?;
        Ok(rmp_serde::from_slice(&bytes)?)
    }
}

// ============================================================================
// Sort
// ============================================================================

/// Concrete value type a sort field is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKind {
    /// Compare as signed integers
    Int,
    /// Compare as floating point numbers
    Float,
    /// Compare lexicographically
    Text,
}

/// What a sort field orders by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortTarget {
    /// Relevance score (descending unless reversed)
    Score,
    /// Document id (ascending unless reversed)
    Doc,
    /// A stored document field
    Field(String),
}

/// One entry of a sort specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// What to order by
    pub target: SortTarget,
    /// Flip the natural direction
    pub reverse: bool,
    /// Bound value type; `None` until resolved against a snapshot
    pub kind: Option<SortKind>,
}

impl SortField {
    /// Sort by a stored field, type to be resolved against a snapshot
    pub fn field(name: impl Into<String>) -> Self {
        SortField {
            target: SortTarget::Field(name.into()),
            reverse: false,
            kind: None,
        }
    }

    /// Sort by relevance score
    pub fn score() -> Self {
        SortField {
            target: SortTarget::Score,
            reverse: false,
            kind: None,
        }
    }

    /// Sort by document id
    pub fn doc() -> Self {
        SortField {
            target: SortTarget::Doc,
            reverse: false,
            kind: None,
        }
    }

    /// Builder: reverse direction
    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    /// Builder: bind the value type up front
    pub fn with_kind(mut self, kind: SortKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Whether this field can be used without consulting a snapshot
    pub fn is_resolved(&self) -> bool {
        match self.target {
            SortTarget::Score | SortTarget::Doc => true,
            SortTarget::Field(_) => self.kind.is_some(),
        }
    }
}

/// Ordered sort specification
///
/// Fields are compared in order; ties after the last field are always broken
/// by ascending document id so the order is total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    /// Sort fields in priority order
    pub fields: Vec<SortField>,
}

impl Sort {
    /// Create a sort from its fields
    pub fn new(fields: Vec<SortField>) -> Self {
        Sort { fields }
    }

    /// Sort by a single stored field, ascending
    pub fn by_field(name: impl Into<String>) -> Self {
        Sort::new(vec![SortField::field(name)])
    }

    /// Builder: append a field
    pub fn then(mut self, field: SortField) -> Self {
        self.fields.push(field);
        self
    }

    /// Whether every field is bound to a concrete type
    pub fn is_resolved(&self) -> bool {
        self.fields.iter().all(SortField::is_resolved)
    }
}

// ============================================================================
// Document
// ============================================================================

/// Stored field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Tokenized, searchable text
    Text(String),
    /// Integer (stored and sortable, not searchable)
    Int(i64),
    /// Float (stored and sortable, not searchable)
    Float(f64),
}

impl FieldValue {
    /// Value type used when sorting on this field
    pub fn sort_kind(&self) -> SortKind {
        match self {
            FieldValue::Text(_) => SortKind::Text,
            FieldValue::Int(_) => SortKind::Int,
            FieldValue::Float(_) => SortKind::Float,
        }
    }

    /// Text content, if this is a text field
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// A document as stored in, or loaded from, the index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Field name -> value
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document::default()
    }

    /// Builder: set a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get a text field value
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Copy of this document restricted to the selected fields
    pub fn project(&self, selection: &FieldSelection) -> Document {
        match selection {
            FieldSelection::All => self.clone(),
            FieldSelection::Only(names) if names.is_empty() => self.clone(),
            FieldSelection::Only(names) => Document {
                fields: self
                    .fields
                    .iter()
                    .filter(|(name, _)| names.contains(name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            },
        }
    }
}

/// Which stored fields to load for each result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    /// Load every stored field
    #[default]
    All,
    /// Load only the named fields (an empty set means all)
    Only(BTreeSet<String>),
}

impl FieldSelection {
    /// Select the given field names
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSelection::Only(names.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// TopDocs / Hit / Limit
// ============================================================================

/// One page of results from a single search call
#[derive(Debug, Clone, Default)]
pub struct TopDocs {
    /// Total matches for the query in the snapshot searched
    pub total_hits: usize,
    /// Results in order, at most the requested page size
    pub score_docs: Vec<ScoreDoc>,
}

impl TopDocs {
    /// Number of results in this page
    pub fn len(&self) -> usize {
        self.score_docs.len()
    }

    /// Whether this page is empty
    pub fn is_empty(&self) -> bool {
        self.score_docs.is_empty()
    }
}

/// A loaded result: projected document and its result token
pub type Hit = (Document, ScoreDoc);

/// Requested page size for a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most this many results per page
    Bounded(usize),
    /// No caller limit; pages are capped by the cursor's maximum page size
    Unbounded,
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        if n == usize::MAX {
            Limit::Unbounded
        } else {
            Limit::Bounded(n)
        }
    }
}

impl From<Option<usize>> for Limit {
    fn from(n: Option<usize>) -> Self {
        n.map_or(Limit::Unbounded, Limit::from)
    }
}
