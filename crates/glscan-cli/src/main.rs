use anyhow::Context;
use clap::Parser;
use glscan_core::ReportBuilder;
use glscan_gitlab::GitLabClient;

mod bootstrap;
mod cli;
mod output;
mod progress;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("glscan error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = bootstrap::load_config(&cli)?;
    let options = bootstrap::scan_options(&config);
    let client = GitLabClient::new(&config.gitlab.api_base(), &config.gitlab.token)
        .context("failed to build GitLab client")?;
    tracing::debug!(api = client.api_base(), user = cli.username(), ?options, "starting scan");

    let console = progress::ConsoleProgress::new(cli.quiet);
    console.start();
    let outcome = glscan_gitlab::scan(&client, cli.username(), &options, &console)
        .await
        .context("failed to list membership projects");
    console.finish();
    let outcome = outcome?;

    let unchecked = outcome.unchecked();
    let report = ReportBuilder::new(outcome.matched);
    eprintln!("Projects you've committed to: {}", report.len());
    if unchecked > 0 {
        eprintln!("Projects that could not be checked: {unchecked}");
    }

    let path = cli.output_path();
    output::write_report(&report, &path, cli.format)?;
    eprintln!("Saved to {}", path.display());
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("GLSCAN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
