//! Probe orchestration and the two-stage scan.

use std::time::Duration;

use glscan_core::Project;
use tokio::task::JoinError;

use crate::{
    CommitProbe, GitLabClient,
    error::{FetchError, ProbeError},
    pages::{PageOptions, SpeculativePaginator},
    pool::BoundedPool,
    progress::{ProgressEvent, ProgressSink},
};

/// What probing one project found.
#[derive(Debug)]
pub enum ProbeOutcome {
    Matched,
    NotMatched,
    Failed(ProbeError),
}

impl From<Result<bool, ProbeError>> for ProbeOutcome {
    fn from(result: Result<bool, ProbeError>) -> Self {
        match result {
            Ok(true) => Self::Matched,
            Ok(false) => Self::NotMatched,
            Err(error) => Self::Failed(error),
        }
    }
}

/// A project paired with its probe outcome.
#[derive(Debug)]
pub struct ProbeResult {
    pub project: Project,
    pub outcome: ProbeOutcome,
}

/// A project whose probe failed.
#[derive(Debug)]
pub struct ProbeFailure {
    pub project: Project,
    pub error: ProbeError,
}

/// Result of the probe stage.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Projects the author has committed to, in probe completion order.
    pub matched: Vec<Project>,
    /// Projects whose probe failed. They are not in `matched`.
    pub failures: Vec<ProbeFailure>,
    /// Number of projects handed to the probe stage.
    pub total: usize,
    /// Number of probes that finished in any way.
    pub checked: usize,
    /// Number of projects with no commit by the author.
    pub not_matched: usize,
    /// Probes whose result never came back, so the project is unknown.
    /// `matched + not_matched + failures + lost == checked`.
    pub lost: usize,
}

impl ScanOutcome {
    /// Projects that were probed but are neither matched nor cleared.
    #[must_use]
    pub fn unchecked(&self) -> usize {
        self.failures.len() + self.lost
    }

    /// Fold one finished probe into the totals and report it to `sink`.
    fn record(&mut self, joined: Result<ProbeResult, JoinError>, sink: &dyn ProgressSink) {
        self.checked += 1;
        let (checked, total) = (self.checked, self.total);
        match joined {
            Ok(ProbeResult {
                project,
                outcome: ProbeOutcome::Matched,
            }) => {
                sink.observe(&ProgressEvent::Matched {
                    checked,
                    total,
                    project: &project,
                });
                self.matched.push(project);
            }
            Ok(ProbeResult {
                project,
                outcome: ProbeOutcome::NotMatched,
            }) => {
                self.not_matched += 1;
                sink.observe(&ProgressEvent::NotMatched {
                    checked,
                    total,
                    project: &project,
                });
            }
            Ok(ProbeResult {
                project,
                outcome: ProbeOutcome::Failed(error),
            }) => {
                sink.observe(&ProgressEvent::Failed {
                    checked,
                    total,
                    project: &project,
                    error: &error,
                });
                self.failures.push(ProbeFailure { project, error });
            }
            Err(join) => {
                // The wrapper itself died; the project is unknown here.
                self.lost += 1;
                tracing::error!(%join, checked, total, "probe wrapper task failed");
            }
        }
    }
}

/// Run `probe` in its own task so a panic still comes back as a failure of
/// `project`.
async fn attributed<F>(project: Project, probe: F) -> ProbeResult
where
    F: Future<Output = Result<bool, ProbeError>> + Send + 'static,
{
    let outcome = match tokio::spawn(probe).await {
        Ok(result) => ProbeOutcome::from(result),
        Err(join) => ProbeOutcome::Failed(ProbeError::Worker(join.to_string())),
    };
    ProbeResult { project, outcome }
}

/// Runs [`CommitProbe`] over a project set through a fixed-width pool.
#[derive(Debug, Clone)]
pub struct ProbeOrchestrator {
    probe: CommitProbe,
    workers: usize,
}

impl ProbeOrchestrator {
    #[must_use]
    pub const fn new(probe: CommitProbe, workers: usize) -> Self {
        Self { probe, workers }
    }

    /// Probe every project, at most `workers` at a time.
    ///
    /// Never fails: a probe that errors (or panics) is recorded in
    /// [`ScanOutcome::failures`] and the remaining projects are still probed.
    /// Nothing is retried.
    pub async fn probe_all(&self, projects: Vec<Project>, sink: &dyn ProgressSink) -> ScanOutcome {
        let total = projects.len();
        sink.observe(&ProgressEvent::ProbesStarted { total });

        let mut jobs = projects.into_iter().map(|project| {
            let probe = self.probe.clone();
            let id = project.id.clone();
            attributed(project, async move { probe.has_user_commits(&id).await })
        });

        let mut pool = BoundedPool::new(self.workers);
        pool.refill(&mut jobs);

        let mut summary = ScanOutcome {
            total,
            ..ScanOutcome::default()
        };
        while let Some(joined) = pool.join_next().await {
            summary.record(joined, sink);
            pool.refill(&mut jobs);
        }
        summary
    }
}

/// Settings for a full scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub pages: PageOptions,
    /// Maximum concurrent probes.
    pub probe_workers: usize,
    /// Per-request timeout for probes.
    pub probe_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            pages: PageOptions::default(),
            probe_workers: 20,
            probe_timeout: Duration::from_secs(10),
        }
    }
}

/// List the user's membership projects, then probe each for commits by
/// `author`. Probing starts only once the listing is complete.
///
/// # Errors
///
/// Returns [`FetchError`] if the listing stage fails. Probe failures are
/// reported in the returned [`ScanOutcome`] instead.
pub async fn scan(
    client: &GitLabClient,
    author: &str,
    options: &ScanOptions,
    sink: &dyn ProgressSink,
) -> Result<ScanOutcome, FetchError> {
    let paginator = SpeculativePaginator::new(client.clone(), options.pages);
    let projects = paginator.membership_projects(sink).await?;

    let probe = CommitProbe::new(client.clone(), author, options.probe_timeout);
    let orchestrator = ProbeOrchestrator::new(probe, options.probe_workers);
    Ok(orchestrator.probe_all(projects, sink).await)
}
