//! GitLab entities as seen by glscan.
//!
//! Only the fields glscan needs are deserialized; GitLab's `simple=true`
//! project representation carries many more that are ignored.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identifier of a GitLab project.
///
/// GitLab returns numeric ids, but the API also accepts the URL-encoded
/// `namespace/project` path wherever an id is expected, so both shapes are
/// kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Numeric(u64),
    Path(String),
}

impl ProjectId {
    /// Render the id as a single URL path segment.
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Numeric(id) => id.to_string(),
            Self::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

impl From<u64> for ProjectId {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ProjectId {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// A project the user is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Display path, e.g. `group/subgroup/project`.
    pub path_with_namespace: String,
    /// ISO-8601 timestamp of the last activity, absent on some instances.
    #[serde(default)]
    pub last_activity_at: Option<String>,
    pub web_url: String,
}

impl Project {
    /// Parse `last_activity_at` as an RFC 3339 timestamp.
    ///
    /// Returns `None` when the field is absent or not parseable.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<FixedOffset>> {
        self.last_activity_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}
