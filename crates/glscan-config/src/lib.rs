//! # glscan-config
//!
//! Layered configuration loading for glscan using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GLSCAN_*` prefix, `__` as separator)
//! 2. `GITLAB_URL` / `GITLAB_TOKEN`
//! 3. Project-level `.glscan/config.toml`
//! 4. User-level `~/.config/glscan/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GLSCAN_GITLAB__URL` -> `gitlab.url`, `GLSCAN_SCAN__MAX_PAGES` -> `scan.max_pages`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use glscan_config::GlscanConfig;
//!
//! let config = GlscanConfig::load_with_dotenv().expect("config");
//! config.scan.validate().expect("valid scan settings");
//! println!("API root: {}", config.gitlab.api_base());
//! ```

mod error;
mod gitlab;
mod scan;

pub use error::ConfigError;
pub use gitlab::{DEFAULT_GITLAB_URL, GitLabConfig};
pub use scan::{MAX_PER_PAGE, ScanConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GlscanConfig {
    #[serde(default)]
    pub gitlab: GitLabConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

impl GlscanConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// A missing `.env` file is not an error.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Check that a scan can run with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when no token is set,
    /// [`ConfigError::InvalidValue`] for an empty instance URL, otherwise
    /// whatever [`ScanConfig::validate`] reports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gitlab.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.gitlab.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "gitlab.url".into(),
                reason: "must not be empty".into(),
            });
        }
        self.scan.validate()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".glscan/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: the conventional GitLab variables
        figment = figment.merge(
            Env::raw()
                .only(&["GITLAB_URL", "GITLAB_TOKEN"])
                .map(|key| {
                    if key.as_str().eq_ignore_ascii_case("GITLAB_URL") {
                        "gitlab.url".into()
                    } else {
                        "gitlab.token".into()
                    }
                }),
        );

        // Layer 4: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("GLSCAN_").split("__"));

        figment
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glscan").join("config.toml"))
    }
}
