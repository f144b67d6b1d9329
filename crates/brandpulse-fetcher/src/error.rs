use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("content API rejected credentials (status {status}) at {url}")]
    AuthRejected { status: u16, url: String },

    #[error("content API quota exhausted at {url}")]
    QuotaExhausted { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for query \"{query}\": exceeded {max_pages} pages")]
    PaginationLimit { query: String, max_pages: usize },

    #[error("invalid content API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl FetchError {
    /// `true` for errors that will not go away on retry: bad credentials or
    /// an exhausted daily quota. A terminal error aborts the current
    /// sub-window's fetch entirely.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchError::AuthRejected { .. } | FetchError::QuotaExhausted { .. }
        )
    }
}
