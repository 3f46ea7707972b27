//! Query model for the in-memory index
//!
//! Cursors never look inside a query; only [`crate::IndexSnapshot`]
//! evaluates it.

/// Predicate over indexed documents
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every document, each scoring 1.0
    MatchAll,

    /// Documents whose text `field` contains any term of `text`
    ///
    /// Scored by summing the per-term contributions of the index scorer.
    Term {
        /// Text field to search
        field: String,
        /// Query text, analyzed like indexed text
        text: String,
    },

    /// Boolean combination
    ///
    /// A document matches when it matches every `must` clause, no `must_not`
    /// clause and, if there are no `must` clauses, at least one `should`
    /// clause. With no positive clauses at all, every document matches with
    /// score 1.0 before `must_not` is applied. Scores of matching positive
    /// clauses are summed.
    Bool {
        /// Required clauses
        must: Vec<Query>,
        /// Optional clauses; add to the score
        should: Vec<Query>,
        /// Excluding clauses
        must_not: Vec<Query>,
    },
}

impl Query {
    /// Term query on `field`
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Empty boolean query (matches everything until clauses are added)
    pub fn boolean() -> Self {
        Query::Bool {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
        }
    }

    /// Builder: add a required clause (turns non-boolean queries into one)
    pub fn must(self, clause: Query) -> Self {
        let (mut must, should, must_not) = self.into_parts();
        must.push(clause);
        Query::Bool {
            must,
            should,
            must_not,
        }
    }

    /// Builder: add an optional clause
    pub fn should(self, clause: Query) -> Self {
        let (must, mut should, must_not) = self.into_parts();
        should.push(clause);
        Query::Bool {
            must,
            should,
            must_not,
        }
    }

    /// Builder: add an excluding clause
    pub fn must_not(self, clause: Query) -> Self {
        let (must, should, mut must_not) = self.into_parts();
        must_not.push(clause);
        Query::Bool {
            must,
            should,
            must_not,
        }
    }

    fn into_parts(self) -> (Vec<Query>, Vec<Query>, Vec<Query>) {
        match self {
            Query::Bool {
                must,
                should,
                must_not,
            } => (must, should, must_not),
            Query::MatchAll => (Vec::new(), Vec::new(), Vec::new()),
            other => (vec![other], Vec::new(), Vec::new()),
        }
    }
}
