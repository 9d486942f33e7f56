use anyhow::Context;
use glscan_config::GlscanConfig;
use glscan_gitlab::{PageOptions, ScanOptions};

use crate::cli::Cli;

/// Load layered config (with `.env`), apply command-line overrides and
/// validate the result.
pub fn load_config(cli: &Cli) -> anyhow::Result<GlscanConfig> {
    let mut config = GlscanConfig::load_with_dotenv().context("failed to load glscan config")?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

pub fn apply_overrides(config: &mut GlscanConfig, cli: &Cli) {
    if let Some(token) = cli.token() {
        config.gitlab.token = token.to_string();
    }
    if let Some(url) = &cli.gitlab_url {
        config.gitlab.url.clone_from(url);
    }

    let scan = &mut config.scan;
    if let Some(per_page) = cli.per_page {
        scan.per_page = per_page;
    }
    if let Some(max_pages) = cli.max_pages {
        scan.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        scan.page_workers = workers;
        scan.probe_workers = workers;
    }
    if let Some(workers) = cli.page_workers {
        scan.page_workers = workers;
    }
    if let Some(workers) = cli.probe_workers {
        scan.probe_workers = workers;
    }
}

#[must_use]
pub fn scan_options(config: &GlscanConfig) -> ScanOptions {
    let scan = &config.scan;
    ScanOptions {
        pages: PageOptions {
            per_page: scan.per_page,
            max_pages: scan.max_pages,
            workers: scan.page_workers,
            timeout: scan.page_timeout(),
        },
        probe_workers: scan.probe_workers,
        probe_timeout: scan.probe_timeout(),
    }
}
