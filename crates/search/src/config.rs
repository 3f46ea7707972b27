//! Search configuration via `search.toml`
//!
//! Holds the knobs that shape paging and scoring. A missing key falls back
//! to its default, so an empty file is a valid configuration.

use crate::cursor::DEFAULT_MAX_PAGE_SIZE;
use crate::scorer::{BM25Scorer, NoIdfScorer, Scorer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use strata_core::{Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "search.toml";

/// Term weighting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    /// BM25 with rarity (IDF) weighting
    #[default]
    Bm25,
    /// BM25 term-frequency saturation with IDF fixed at 1.0
    NoIdf,
}

/// Search configuration loaded from `search.toml`.
///
/// # Example
///
/// ```toml
/// max_page_size = 10000
/// scorer = "no-idf"
/// k1 = 1.2
/// b = 0.75
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on the number of results one fetch may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Scoring strategy
    #[serde(default)]
    pub scorer: ScorerKind,
    /// BM25 term frequency saturation
    #[serde(default = "default_k1")]
    pub k1: f32,
    /// BM25 length normalization, between 0 and 1
    #[serde(default = "default_b")]
    pub b: f32,
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_k1() -> f32 {
    1.2
}

fn default_b() -> f32 {
    0.75
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            scorer: ScorerKind::default(),
            k1: default_k1(),
            b: default_b(),
        }
    }
}

impl SearchConfig {
    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns an error if `max_page_size` is 0, `k1` is negative, or `b`
    /// is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(Error::invalid_input(
                "max_page_size in search.toml must be at least 1",
            ));
        }
        if self.k1.is_nan() || self.k1 < 0.0 {
            return Err(Error::invalid_input(format!(
                "k1 in search.toml must be non-negative, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::invalid_input(format!(
                "b in search.toml must be between 0 and 1, got {}",
                self.b
            )));
        }
        Ok(())
    }

    /// Build the configured scorer
    pub fn build_scorer(&self) -> Arc<dyn Scorer> {
        match self.scorer {
            ScorerKind::Bm25 => Arc::new(BM25Scorer::new(self.k1, self.b)),
            ScorerKind::NoIdf => Arc::new(NoIdfScorer::new(self.k1, self.b)),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata search configuration
#
# Largest page a cursor may request in one fetch (default 10000).
max_page_size = 10000

# Term weighting: "bm25" (default) or "no-idf"
#   "bm25"   = rare terms weigh more than common ones
#   "no-idf" = term rarity is ignored; only term frequency counts
scorer = "bm25"

# BM25 parameters
k1 = 1.2
b = 0.75
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SearchConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::SerializationError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
