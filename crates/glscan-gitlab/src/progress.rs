//! Progress observations emitted while a scan runs.
//!
//! The engine never prints. It hands every observation to a
//! [`ProgressSink`]; the CLI renders them as console lines, everything else
//! can use [`TracingProgress`].

use glscan_core::Project;

use crate::error::ProbeError;

/// One observation from the listing or probe stage.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// A non-empty listing page arrived.
    PageFetched { page: u32, items: usize },
    /// The highest requested page was non-empty, so the listing may continue
    /// past the ceiling and has been truncated.
    CeilingReached { max_pages: u32, per_page: u32 },
    /// The listing stage finished.
    ListingComplete { total: usize },
    /// The probe stage is about to start.
    ProbesStarted { total: usize },
    /// The user has committed to `project`.
    Matched {
        checked: usize,
        total: usize,
        project: &'a Project,
    },
    /// No commit by the user was found in `project`.
    NotMatched {
        checked: usize,
        total: usize,
        project: &'a Project,
    },
    /// Probing `project` failed; it is left out of the matches.
    Failed {
        checked: usize,
        total: usize,
        project: &'a Project,
        error: &'a ProbeError,
    },
}

/// Receiver for [`ProgressEvent`]s.
///
/// Called from the single aggregation loop of each stage, never from inside
/// worker tasks.
pub trait ProgressSink: Send + Sync {
    fn observe(&self, event: &ProgressEvent<'_>);
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn observe(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::PageFetched { page, items } => {
                tracing::info!(page, items, "page fetched");
            }
            ProgressEvent::CeilingReached {
                max_pages,
                per_page,
            } => {
                tracing::warn!(
                    max_pages,
                    per_page,
                    "last requested page was full; listing may be truncated, raise max_pages"
                );
            }
            ProgressEvent::ListingComplete { total } => {
                tracing::info!(total, "listing complete");
            }
            ProgressEvent::ProbesStarted { total } => {
                tracing::info!(total, "probing projects for commits");
            }
            ProgressEvent::Matched {
                checked,
                total,
                project,
            } => {
                tracing::info!(checked, total, project = %project.path_with_namespace, "matched");
            }
            ProgressEvent::NotMatched {
                checked,
                total,
                project,
            } => {
                tracing::debug!(checked, total, project = %project.path_with_namespace, "not matched");
            }
            ProgressEvent::Failed {
                checked,
                total,
                project,
                error,
            } => {
                tracing::warn!(
                    checked,
                    total,
                    project = %project.path_with_namespace,
                    %error,
                    "probe failed"
                );
            }
        }
    }
}
