//! Errors raised while loading or checking glscan settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or environment variable could not be read into
    /// [`crate::GlscanConfig`].
    #[error("failed to read glscan settings: {0}")]
    Figment(#[from] figment::Error),

    /// No personal access token from the command line, `GITLAB_TOKEN`,
    /// `GLSCAN_GITLAB__TOKEN` or `gitlab.token`.
    #[error(
        "no GitLab token: pass it before the username, set GITLAB_TOKEN, \
         or add `token` under [gitlab] in .glscan/config.toml"
    )]
    MissingToken,

    /// A scan setting that would fetch nothing or never finish.
    #[error("{field} {reason}")]
    InvalidValue { field: String, reason: String },
}
