use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One non-blank line from the input list. Positions are 1-based and count
/// non-blank lines only, so they stay aligned with checkpoint offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    pub position: u64,
    pub title: String,
}

/// Best IMDb match for a title. Optional fields stay empty when the provider
/// has no data for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub position: u64,
    pub imdb_id: String,
    pub title: String,
    pub url: String,
    pub rating: Option<f64>,
    pub votes: Option<u64>,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub runtime_minutes: Option<i32>,
    pub release_date: Option<String>,
    pub directors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub position: u64,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no results found")]
    NotFound,
    #[error("no TV series found in results")]
    NoTvMatch,
    #[error("HTTP {0}")]
    Http(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    BadResponse(String),
}

impl LookupError {
    /// Whether a retry has any chance of a different outcome.
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::Network(_) => true,
            LookupError::Http(status) => {
                matches!(status, 405 | 408 | 429) || *status >= 500
            }
            LookupError::NotFound | LookupError::NoTvMatch | LookupError::BadResponse(_) => false,
        }
    }
}
