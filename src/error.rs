use thiserror::Error;

/// Errors raised by the name index.
///
/// A missing match or an ambiguous match is never an error; those are
/// reported through [`MatchType`](crate::models::MatchType).
#[derive(Debug, Error)]
pub enum NameIndexError {
    /// The caller handed in a query that cannot be matched at all.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Index entries need an id and a scientific name.
    #[error("invalid index entry: {0}")]
    InvalidEntry(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed author map at line {line}: {reason}")]
    AuthorMap { line: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, NameIndexError>;
