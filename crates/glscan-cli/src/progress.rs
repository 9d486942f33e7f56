use std::io::IsTerminal;
use std::sync::atomic::{AtomicUsize, Ordering};

use glscan_gitlab::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

/// Thin wrapper over an optional indicatif bar; every method is a no-op when
/// the bar is disabled.
pub struct Progress {
    bar: Option<ProgressBar>,
}

fn terminal_columns() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
}

fn bar_template() -> &'static str {
    match terminal_columns() {
        Some(cols) if cols >= 110 => "{bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

impl Progress {
    #[must_use]
    pub const fn disabled() -> Self {
        Self { bar: None }
    }

    #[must_use]
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    /// Turn the spinner into a bar of `total` steps.
    pub fn into_bar(&self, total: u64, message: &str) {
        if let Some(bar) = &self.bar {
            bar.disable_steady_tick();
            bar.set_style(
                ProgressStyle::with_template(bar_template())
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_length(total);
            bar.set_position(0);
            bar.set_message(message.to_string());
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn set_position(&self, position: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(position);
        }
    }

    /// Print a line above the bar, or straight to stderr without one.
    pub fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

pub const LISTING_HEADING: &str = "Fetching membership projects...";
pub const PROBING_HEADING: &str = "Checking for your commits (this may take a while)...";

/// Console rendering of scan progress on stderr.
pub struct ConsoleProgress {
    progress: Progress,
    quiet: bool,
    listed: AtomicUsize,
}

impl ConsoleProgress {
    /// The animated bar is only drawn on an interactive stderr.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let progress = if quiet || !std::io::stderr().is_terminal() {
            Progress::disabled()
        } else {
            Progress::spinner("listing membership projects")
        };
        Self {
            progress,
            quiet,
            listed: AtomicUsize::new(0),
        }
    }

    /// Announce the listing stage. Call before the scan starts.
    pub fn start(&self) {
        self.summary(LISTING_HEADING);
    }

    /// Print a summary line regardless of `--quiet`.
    pub fn summary(&self, line: &str) {
        self.progress.println(line);
    }

    pub fn finish(&self) {
        self.progress.finish_clear();
    }
}

impl ProgressSink for ConsoleProgress {
    fn observe(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::PageFetched { items, .. } => {
                let listed = self.listed.fetch_add(*items, Ordering::Relaxed) + items;
                self.progress
                    .set_message(&format!("listing membership projects: {listed} so far"));
            }
            ProgressEvent::ListingComplete { total } => {
                self.summary(&format!("Total membership projects: {total}"));
            }
            ProgressEvent::ProbesStarted { total } => {
                self.progress
                    .into_bar(*total as u64, "checking commit authorship");
            }
            ProgressEvent::Matched { checked, .. }
            | ProgressEvent::NotMatched { checked, .. }
            | ProgressEvent::Failed { checked, .. } => {
                self.progress.set_position(*checked as u64);
            }
            ProgressEvent::CeilingReached { .. } => {}
        }

        if let Some(heading) = heading(event) {
            self.summary(heading);
        }
        if !self.quiet
            && let Some(line) = render(event)
        {
            self.progress.println(&line);
        }
    }
}

/// Stage heading printed when `event` opens a new stage, even with
/// `--quiet`.
#[must_use]
pub const fn heading(event: &ProgressEvent<'_>) -> Option<&'static str> {
    match event {
        ProgressEvent::ProbesStarted { .. } => Some(PROBING_HEADING),
        _ => None,
    }
}

/// Console line for an event, if it gets one.
#[must_use]
pub fn render(event: &ProgressEvent<'_>) -> Option<String> {
    let line = match event {
        ProgressEvent::PageFetched { page, items } => format!("  page {page}: {items} projects"),
        ProgressEvent::CeilingReached {
            max_pages,
            per_page,
        } => format!(
            "warning: page {max_pages} was full; projects beyond {} may be missing \
             (raise --max-pages)",
            u64::from(*max_pages) * u64::from(*per_page)
        ),
        ProgressEvent::Matched {
            checked,
            total,
            project,
        } => format!("  [{checked}/{total}] ✓ {}", project.path_with_namespace),
        ProgressEvent::NotMatched {
            checked,
            total,
            project,
        } => format!("  [{checked}/{total}]   {}", project.path_with_namespace),
        ProgressEvent::Failed {
            checked,
            total,
            project,
            error,
        } => format!(
            "  [{checked}/{total}] ! {}: {error}",
            project.path_with_namespace
        ),
        ProgressEvent::ListingComplete { .. } | ProgressEvent::ProbesStarted { .. } => {
            return None;
        }
    };
    Some(line)
}
