use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which comparison drives the author comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorOrdering {
    /// Compare years first and only then author teams.
    #[default]
    YearFirst,
    /// Compare author teams first and let a close year override a mismatch.
    AuthorsFirst,
}

/// Thresholds used by the author comparator.
/// Defaults reproduce the established matching behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorSettings {
    /// Years further apart than this are always different.
    pub year_tolerance: u32,
    /// Years this close count as the same year.
    pub year_match_tolerance: u32,
    /// Year tolerance used when authors are compared first.
    pub authors_first_year_tolerance: u32,
    pub min_common_substring: usize,
    /// Authors shorter than this are expanded from the author map.
    pub min_author_length_without_lookup: usize,
    pub min_jaro_similarity: f64,
    /// Multiplier on `min_common_substring` when years are close but not equal.
    pub strict_factor: usize,
    pub strict_jaro_similarity: f64,
}

impl Default for ComparatorSettings {
    fn default() -> Self {
        Self {
            year_tolerance: 11,
            year_match_tolerance: 1,
            authors_first_year_tolerance: 2,
            min_common_substring: 4,
            min_author_length_without_lookup: 4,
            min_jaro_similarity: 90.0,
            strict_factor: 3,
            strict_jaro_similarity: 97.0,
        }
    }
}

/// Settings of a name index instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Prefix of ids minted by the index. Only names carrying it are reloaded.
    pub id_prefix: String,
    /// Dataset the index reads from and writes new names into.
    pub dataset_key: i32,
    pub author_ordering: AuthorOrdering,
    pub comparator: ComparatorSettings,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            id_prefix: "NI".to_string(),
            dataset_key: 1,
            author_ordering: AuthorOrdering::default(),
            comparator: ComparatorSettings::default(),
        }
    }
}

impl IndexConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    pub fn with_dataset(mut self, dataset_key: i32) -> Self {
        self.dataset_key = dataset_key;
        self
    }

    pub fn with_ordering(mut self, ordering: AuthorOrdering) -> Self {
        self.author_ordering = ordering;
        self
    }
}
