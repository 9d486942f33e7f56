//! GitLab error types.
//!
//! Pagination and probing fail in different ways on purpose:
//! [`FetchError`] aborts a run, [`ProbeError`] is captured per project and
//! never escapes the probe stage.

use thiserror::Error;

/// Errors building a [`crate::GitLabClient`].
#[derive(Debug, Error)]
pub enum GitLabError {
    /// The access token cannot be used as a header value.
    #[error("invalid access token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    /// The API base URL is empty or not an http(s) URL.
    #[error("invalid GitLab API URL '{0}'")]
    InvalidUrl(String),

    /// The underlying HTTP client failed to build.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Fatal errors from the listing stage.
///
/// Pages past the end of a listing come back as empty arrays, so any of these
/// means the listing itself is broken and the run must stop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport error (connect, timeout, body read).
    #[error("page {page}: HTTP error: {source}")]
    Http {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// GitLab returned a non-success status code.
    #[error("page {page}: API error ({status}): {message}")]
    Api {
        page: u32,
        status: u16,
        message: String,
    },

    /// GitLab returned 429 Too Many Requests. Reported, never retried.
    #[error("page {page}: rate limited, retry after {retry_after_secs}s")]
    RateLimited { page: u32, retry_after_secs: u64 },

    /// The page body was not a JSON array of the expected shape.
    #[error("page {page}: parse error: {message}")]
    Decode { page: u32, message: String },

    /// A page worker panicked or was cancelled.
    #[error("page worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl FetchError {
    /// Page number the error belongs to, if it is tied to one.
    #[must_use]
    pub const fn page(&self) -> Option<u32> {
        match self {
            Self::Http { page, .. }
            | Self::Api { page, .. }
            | Self::RateLimited { page, .. }
            | Self::Decode { page, .. } => Some(*page),
            Self::Worker(_) => None,
        }
    }
}

/// Per-project probe failure. Recorded and reported, never propagated.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// HTTP transport error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success response whose body was not a JSON array.
    #[error("parse error: {0}")]
    Decode(String),

    /// The probe task panicked.
    #[error("probe worker failed: {0}")]
    Worker(String),
}
