use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Report file format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Top-level CLI parser for the `glscan` binary.
#[derive(Debug, Parser)]
#[command(
    name = "glscan",
    version,
    about = "List the GitLab projects you are a member of and have committed to"
)]
pub struct Cli {
    /// Personal access token and GitLab username. The token may be omitted
    /// when GITLAB_TOKEN or the config file provides one.
    #[arg(
        value_names = ["TOKEN", "USERNAME"],
        num_args = 1..=2,
        required = true
    )]
    pub positionals: Vec<String>,

    /// GitLab instance URL (default https://gitlab.com)
    #[arg(long)]
    pub gitlab_url: Option<String>,

    /// Projects per listing page (1-100)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Highest listing page requested
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Concurrent requests for both listing and probing
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Concurrent listing page requests (overrides --workers)
    #[arg(long)]
    pub page_workers: Option<usize>,

    /// Concurrent commit probes (overrides --workers)
    #[arg(long)]
    pub probe_workers: Option<usize>,

    /// Report path (default gitlab_committed_<username>.<format>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value = "csv")]
    pub format: OutputFormat,

    /// Quiet mode (no progress lines)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The commit author to look for; always the last positional.
    #[must_use]
    pub fn username(&self) -> &str {
        self.positionals.last().map_or("", String::as_str)
    }

    /// Token given on the command line, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self.positionals.as_slice() {
            [token, _] => Some(token),
            _ => None,
        }
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "gitlab_committed_{}.{}",
                self.username(),
                self.format.extension()
            ))
        })
    }
}
