use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracker_scout::cli::Cli;
use tracker_scout::output::{preview_lines, write_trackers};
use tracker_scout::parsing::collect_candidates;
use tracker_scout::sources::SourceFetcher;
use tracker_scout::tracing_setup::init_tracing;
use tracker_scout::{Orchestrator, TrackerProber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.log_dir.as_deref())
        .context("failed to set up logging")?;

    let config = cli.into_config();
    config.validate()?;

    let fetcher = SourceFetcher::new(&config.sources)?;
    let lines = fetcher.fetch_all(&config.sources.urls).await;
    let candidates = collect_candidates(&lines);
    tracing::info!("Found {} unique trackers", candidates.len());

    let prober = TrackerProber::new(&config.probe)?;
    let orchestrator = Orchestrator::new(Arc::new(prober), config.probe.clone());

    let trackers = orchestrator
        .orchestrate(&candidates)
        .await
        .with_context(|| format!("nothing written to {}", config.output.path.display()))?;

    write_trackers(
        &config.output.path,
        &trackers,
        config.output.blank_line_separator,
    )
    .with_context(|| format!("failed to write {}", config.output.path.display()))?;
    tracing::info!(
        "Saved the best {} trackers to {}",
        trackers.len(),
        config.output.path.display()
    );

    if config.output.preview > 0 && !trackers.is_empty() {
        tracing::info!("Top {} trackers:", config.output.preview.min(trackers.len()));
        for line in preview_lines(&trackers, config.output.preview) {
            tracing::info!("{}", line);
        }
    }

    Ok(())
}
