//! # glscan-gitlab
//!
//! GitLab REST access for glscan:
//! - [`SpeculativePaginator`]: fetches every page of a listing whose length is
//!   unknown by requesting pages `1..=max_pages` concurrently and treating
//!   empty pages as the end marker
//! - [`CommitProbe`]: checks whether an author has any commit in a project
//! - [`ProbeOrchestrator`]: runs the probe over a project set with bounded
//!   concurrency, collecting matches and per-project failures
//! - [`scan`]: both stages in sequence

mod error;
mod pages;
mod pool;
mod probe;
mod progress;
mod scan;

pub use error::{FetchError, GitLabError, ProbeError};
pub use pages::{Listing, Page, PageOptions, SpeculativePaginator};
pub use probe::CommitProbe;
pub use progress::{ProgressEvent, ProgressSink, TracingProgress};
pub use scan::{
    ProbeFailure, ProbeOrchestrator, ProbeOutcome, ProbeResult, ScanOptions, ScanOutcome, scan,
};

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};

/// Header GitLab reads personal access tokens from (`PRIVATE-TOKEN`).
/// Header names must be lowercase to be used as static names.
pub const TOKEN_HEADER: &str = "private-token";

// ── Client ─────────────────────────────────────────────────────────

/// Shared GitLab REST client.
///
/// Cloning is cheap and every clone shares one connection pool and the same
/// read-only base URL and auth header, so clones are handed to worker tasks
/// directly.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    api_base: Arc<str>,
}

impl GitLabClient {
    /// Create a client for `api_base` (e.g. `https://gitlab.com/api/v4`)
    /// that sends `token` on every request.
    ///
    /// No client-wide timeout is set; each stage applies its own per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError`] if the URL is not http(s), the token is not a
    /// valid header value, or the HTTP client fails to build.
    pub fn new(api_base: &str, token: &str) -> Result<Self, GitLabError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("glscan/", env!("CARGO_PKG_VERSION")))
            .default_headers(auth_headers(token)?)
            .build()?;
        Self::from_http(http, api_base)
    }

    /// Wrap an already configured `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::InvalidUrl`] if `api_base` is not an http(s) URL.
    pub fn from_http(http: reqwest::Client, api_base: &str) -> Result<Self, GitLabError> {
        let api_base = api_base.trim_end_matches('/');
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(GitLabError::InvalidUrl(api_base.to_string()));
        }
        Ok(Self {
            http,
            api_base: Arc::from(api_base),
        })
    }

    /// REST API root without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Default headers carrying the access token. The value is marked sensitive
/// so it is redacted from debug output.
///
/// # Errors
///
/// Returns [`GitLabError::InvalidToken`] if `token` contains characters that
/// are not allowed in a header value.
pub fn auth_headers(token: &str) -> Result<HeaderMap, GitLabError> {
    let mut value = HeaderValue::from_str(token)?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(TOKEN_HEADER, value);
    Ok(headers)
}
