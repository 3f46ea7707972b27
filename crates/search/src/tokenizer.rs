//! Text analysis for indexing and querying
//!
//! Text fields and query text go through the same analysis so that terms
//! line up: lowercase, split on non-alphanumeric characters, drop tokens
//! shorter than 2 characters. No stemming or stopwords.

use std::collections::{HashMap, HashSet};

/// Tokenize text into searchable terms
///
/// # Example
///
/// ```
/// use strata_search::tokenizer::tokenize;
///
/// let tokens = tokenize("Patient: Jane O'Neil");
/// assert_eq!(tokens, vec!["patient", "jane", "neil"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() >= 2)
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, keeping first-seen order
///
/// Used for query text, where repeating a term must not count twice.
///
/// # Example
///
/// ```
/// use strata_search::tokenizer::tokenize_unique;
///
/// let tokens = tokenize_unique("fever Fever cough");
/// assert_eq!(tokens, vec!["fever", "cough"]);
/// ```
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Term frequencies of `text` and its length in tokens
pub fn term_frequencies(text: &str) -> (HashMap<String, u32>, u32) {
    let mut freqs: HashMap<String, u32> = HashMap::new();
    let mut len = 0u32;
    for token in tokenize(text) {
        *freqs.entry(token).or_insert(0) += 1;
        len += 1;
    }
    (freqs, len)
}
