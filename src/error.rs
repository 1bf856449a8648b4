//! Error taxonomy for the search core

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for search, metadata and caption lookups
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// Search or metadata service unreachable, malformed response or unknown id.
    /// License checks propagate this unchanged.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Caption lookup failed. The video filter turns this into "no captions".
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
