//! GitLab endpoint configuration.

use serde::{Deserialize, Serialize};

/// Public GitLab, used when no instance URL is configured.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

fn default_url() -> String {
    DEFAULT_GITLAB_URL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitLabConfig {
    /// Instance root URL without the `/api/v4` suffix.
    #[serde(default = "default_url")]
    pub url: String,

    /// Personal access token sent as `PRIVATE-TOKEN`.
    #[serde(default)]
    pub token: String,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
        }
    }
}

impl GitLabConfig {
    /// Check if the GitLab config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.token.is_empty()
    }

    /// REST API root, e.g. `https://gitlab.com/api/v4`.
    pub fn api_base(&self) -> String {
        format!("{}/api/v4", self.url.trim_end_matches('/'))
    }
}
