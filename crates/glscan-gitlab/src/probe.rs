//! Commit authorship probe.

use std::sync::Arc;
use std::time::Duration;

use glscan_core::ProjectId;
use serde::de::IgnoredAny;

use crate::{GitLabClient, error::ProbeError};

/// Decides whether one author has at least one commit in a project.
///
/// Two requests at most, each asking for a single commit:
/// 1. `?author=<name>&per_page=1` on the default branch
/// 2. `?all=true&per_page=1&author=<name>` across all refs, only when the
///    first found nothing
///
/// A non-success status counts as "no commits" for that request. Transport
/// and body errors are returned as [`ProbeError`].
#[derive(Debug, Clone)]
pub struct CommitProbe {
    client: GitLabClient,
    author: Arc<str>,
    timeout: Duration,
}

impl CommitProbe {
    /// `author` is passed to GitLab as-is; GitLab matches it against commit
    /// author names and emails.
    #[must_use]
    pub fn new(client: GitLabClient, author: &str, timeout: Duration) -> Self {
        Self {
            client,
            author: Arc::from(author),
            timeout,
        }
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// # Errors
    ///
    /// Returns [`ProbeError`] if either request fails in transport or a
    /// success response is not a JSON array.
    pub async fn has_user_commits(&self, project: &ProjectId) -> Result<bool, ProbeError> {
        let commits_url = format!(
            "{}/projects/{}/repository/commits",
            self.client.api_base(),
            project.to_path_segment()
        );
        let author = urlencoding::encode(&self.author);

        if self
            .any_commit(&format!("{commits_url}?author={author}&per_page=1"))
            .await?
        {
            return Ok(true);
        }

        tracing::trace!(%project, "default-branch probe empty, trying all refs");
        self.any_commit(&format!("{commits_url}?all=true&per_page=1&author={author}"))
            .await
    }

    async fn any_commit(&self, url: &str) -> Result<bool, ProbeError> {
        let resp = self
            .client
            .http()
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;
        if !resp.status().is_success() {
            tracing::debug!(status = resp.status().as_u16(), url, "commit listing refused");
            return Ok(false);
        }
        let body = resp.text().await?;
        let commits = serde_json::from_str::<Vec<IgnoredAny>>(&body)
            .map_err(|e| ProbeError::Decode(e.to_string()))?;
        Ok(!commits.is_empty())
    }
}
