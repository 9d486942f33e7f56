//! Scan tuning: page size, speculative ceiling, pool widths, timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// GitLab refuses `per_page` values above this.
pub const MAX_PER_PAGE: u32 = 100;

const fn default_per_page() -> u32 {
    100
}

/// Speculative page ceiling. Listings longer than
/// `max_pages * per_page` items are truncated, so keep this comfortably
/// above the largest membership set you expect.
const fn default_max_pages() -> u32 {
    200
}

const fn default_workers() -> usize {
    20
}

const fn default_page_timeout_secs() -> u64 {
    30
}

const fn default_probe_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Items requested per listing page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Highest page number requested by the speculative paginator.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Concurrent page fetches.
    #[serde(default = "default_workers")]
    pub page_workers: usize,

    /// Concurrent commit probes.
    #[serde(default = "default_workers")]
    pub probe_workers: usize,

    /// Per-request timeout for listing pages, in seconds.
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Per-request timeout for commit probes, in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            page_workers: default_workers(),
            probe_workers: default_workers(),
            page_timeout_secs: default_page_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl ScanConfig {
    pub const fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Reject values that would make a scan fetch nothing or hang.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(invalid(
                "scan.per_page",
                format!("must be between 1 and {MAX_PER_PAGE}, got {}", self.per_page),
            ));
        }
        if self.max_pages == 0 {
            return Err(invalid("scan.max_pages", "must be at least 1".into()));
        }
        if self.page_workers == 0 {
            return Err(invalid("scan.page_workers", "must be at least 1".into()));
        }
        if self.probe_workers == 0 {
            return Err(invalid("scan.probe_workers", "must be at least 1".into()));
        }
        if self.page_timeout_secs == 0 {
            return Err(invalid("scan.page_timeout_secs", "must be at least 1".into()));
        }
        if self.probe_timeout_secs == 0 {
            return Err(invalid("scan.probe_timeout_secs", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    }
}
