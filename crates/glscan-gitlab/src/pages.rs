//! Speculative parallel pagination.
//!
//! GitLab can omit `X-Total`/`X-Total-Pages` on large listings, so the page
//! count is guessed instead: every page from 1 to a configured ceiling is
//! requested through a bounded pool, and pages past the real end come back
//! as empty arrays. Any error is fatal, because a healthy listing never
//! answers a page request with one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use glscan_core::Project;
use reqwest::{StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::{
    GitLabClient,
    error::FetchError,
    pool::BoundedPool,
    progress::{ProgressEvent, ProgressSink},
};

/// A paginated listing endpoint: path below the API root plus fixed query
/// parameters. `page` and `per_page` are added per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    path: String,
    params: Vec<(String, String)>,
}

impl Listing {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Projects the token's user is a member of, in the minimal
    /// `simple=true` representation.
    #[must_use]
    pub fn membership_projects() -> Self {
        Self::new("/projects")
            .param("membership", "true")
            .param("simple", "true")
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Full URL for one page of this listing.
    #[must_use]
    pub fn page_url(&self, api_base: &str, page: u32, per_page: u32) -> String {
        let mut url = format!("{api_base}{}?", self.path);
        for (key, value) in &self.params {
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }
        url.push_str(&format!("per_page={per_page}&page={page}"));
        url
    }
}

/// One fetched page. Empty `items` marks a page past the end of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub number: u32,
    pub items: Vec<T>,
}

/// Paginator tuning. Every field is a hard setting, never adjusted at run
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Items per page (GitLab caps this at 100).
    pub per_page: u32,
    /// Speculative ceiling: pages `1..=max_pages` are requested. Items past
    /// `max_pages * per_page` are never fetched.
    pub max_pages: u32,
    /// Maximum concurrent page requests.
    pub workers: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_pages: 200,
            workers: 20,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GitLabClient {
    /// Fetch a single page of `listing`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, GitLab returns a
    /// non-success status, or the body is not a JSON array of `T`.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        listing: &Listing,
        page: u32,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Page<T>, FetchError> {
        let url = listing.page_url(self.api_base(), page, per_page);
        let resp = self
            .http()
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| FetchError::Http { page, source })?;
        if !resp.status().is_success() {
            return Err(refused(page, resp).await);
        }
        let body = resp
            .text()
            .await
            .map_err(|source| FetchError::Http { page, source })?;
        let items = serde_json::from_str::<Vec<T>>(&body).map_err(|e| FetchError::Decode {
            page,
            message: e.to_string(),
        })?;
        Ok(Page {
            number: page,
            items,
        })
    }
}

/// GitLab's suggested wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Error for a page GitLab answered with a non-2xx status.
///
/// A 429 becomes [`FetchError::RateLimited`] with the server's hint so the
/// run can be repeated later; everything else keeps status and body.
async fn refused(page: u32, resp: reqwest::Response) -> FetchError {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return FetchError::RateLimited {
            page,
            retry_after_secs,
        };
    }
    FetchError::Api {
        page,
        status: status.as_u16(),
        message: resp.text().await.unwrap_or_default(),
    }
}

/// Retrieves a complete listing without knowing its length up front.
#[derive(Debug, Clone)]
pub struct SpeculativePaginator {
    client: GitLabClient,
    options: PageOptions,
}

impl SpeculativePaginator {
    #[must_use]
    pub const fn new(client: GitLabClient, options: PageOptions) -> Self {
        Self { client, options }
    }

    #[must_use]
    pub const fn options(&self) -> &PageOptions {
        &self.options
    }

    /// Fetch pages `1..=max_pages` concurrently and return the items of all
    /// non-empty pages.
    ///
    /// Items are appended in page completion order, not page order.
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`] any page produces. Pages still in
    /// flight are aborted and no partial result is returned.
    pub async fn fetch_all<T>(
        &self,
        listing: &Listing,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let PageOptions {
            per_page,
            max_pages,
            workers,
            timeout,
        } = self.options;
        let listing = Arc::new(listing.clone());

        let mut jobs = (1..=max_pages).map(|page| {
            let client = self.client.clone();
            let listing = Arc::clone(&listing);
            async move {
                client
                    .fetch_page::<T>(&listing, page, per_page, timeout)
                    .await
            }
        });

        let mut pool = BoundedPool::new(workers);
        pool.refill(&mut jobs);

        let mut items = Vec::new();
        let mut ceiling_page_full = false;
        while let Some(joined) = pool.join_next().await {
            let page = joined??;
            if page.items.is_empty() {
                tracing::debug!(page = page.number, "empty page");
            } else {
                if page.number == max_pages {
                    ceiling_page_full = true;
                }
                sink.observe(&ProgressEvent::PageFetched {
                    page: page.number,
                    items: page.items.len(),
                });
                items.extend(page.items);
            }
            pool.refill(&mut jobs);
            tracing::trace!(in_flight = pool.in_flight(), "page pool refilled");
        }

        if ceiling_page_full {
            sink.observe(&ProgressEvent::CeilingReached {
                max_pages,
                per_page,
            });
        }
        Ok(items)
    }

    /// Fetch every project the token's user is a member of.
    ///
    /// A project seen twice (the listing can shift while pages are read in
    /// parallel) is kept once.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_all`].
    pub async fn membership_projects(
        &self,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Project>, FetchError> {
        let projects: Vec<Project> = self
            .fetch_all(&Listing::membership_projects(), sink)
            .await?;
        let projects = dedup_by_id(projects);
        sink.observe(&ProgressEvent::ListingComplete {
            total: projects.len(),
        });
        Ok(projects)
    }
}

fn dedup_by_id(projects: Vec<Project>) -> Vec<Project> {
    let mut seen = HashSet::with_capacity(projects.len());
    projects
        .into_iter()
        .filter(|project| {
            let fresh = seen.insert(project.id.clone());
            if !fresh {
                tracing::warn!(
                    id = %project.id,
                    project = %project.path_with_namespace,
                    "duplicate project in listing, keeping first"
                );
            }
            fresh
        })
        .collect()
}
