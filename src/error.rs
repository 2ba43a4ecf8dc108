//! Error types for the guidewatch core.
//!
//! Split by failure domain so callers can tell a retry-exhausted
//! classification failure apart from a storage or validation failure
//! without matching on message strings. The presentation layer owns the
//! mapping to user-facing responses.

use thiserror::Error;

/// Failure while talking to the zero-shot classification endpoint.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// Network-level failure: connect, TLS, timeout, body read.
    #[error("classification request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 408 from the endpoint.
    #[error("classification endpoint timed out (408): {body}")]
    Timeout { body: String },

    /// HTTP 429 from the endpoint.
    #[error("classification endpoint rate limited the request (429): {body}")]
    RateLimited { body: String },

    /// Any 5xx from the endpoint.
    #[error("classification endpoint returned {status}: {body}")]
    Server { status: u16, body: String },

    /// Any other 4xx. Never retried.
    #[error("classification request rejected with {status}: {body}")]
    Client { status: u16, body: String },

    /// The endpoint answered 200 with an empty candidate array.
    #[error("classification endpoint returned an empty candidate list")]
    EmptyResponse,

    /// The response body was not a JSON array of label/score pairs.
    #[error("classification response could not be parsed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ClassificationError {
    /// Whether the retry loop may attempt the call again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout { .. } | Self::RateLimited { .. } | Self::Server { .. }
        )
    }
}

/// Input rejected before any network or storage work happened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} contains invalid or unsafe content")]
    UnsafeContent { field: &'static str },

    #[error("page must be >= 1, got {0}")]
    InvalidPage(u32),

    #[error("page size must be >= 1, got {0}")]
    InvalidPageSize(u32),
}

/// Persistence failure in the analysis store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to prepare store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task aborted: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// Failure of one analyze cycle.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request was rejected before classification started.
    #[error("invalid analyze request: {0}")]
    Invalid(#[from] ValidationError),

    /// The classifier failed after exhausting its own retry budget.
    /// Nothing was persisted.
    #[error("failed to classify action: {0}")]
    Classification(#[source] ClassificationError),

    /// Classification succeeded but the record could not be stored.
    /// The classification work is not retried or queued.
    #[error(transparent)]
    Store(#[from] StoreError),
}
