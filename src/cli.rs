use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{ScoutConfig, DEFAULT_ALIVE_STATUSES};
use crate::tracing_setup::CliLogLevel;

#[derive(Parser, Debug)]
#[command(name = "tracker-scout")]
#[command(about = "Collects public BitTorrent tracker lists and keeps the ones that answer")]
pub struct Cli {
    /// Tracker list URL to read (repeatable, replaces the built-in lists)
    #[arg(long = "source", value_name = "URL")]
    pub sources: Vec<String>,

    /// File the ranked list is written to
    #[arg(short, long, default_value = "best.txt")]
    pub output: PathBuf,

    /// Maximum probes in flight
    #[arg(short, long, default_value_t = 500)]
    pub concurrency: usize,

    /// Per-probe timeout in seconds
    #[arg(short, long, default_value_t = 5.0)]
    pub timeout: f64,

    /// Keep at most this many trackers (0 keeps all)
    #[arg(short, long, default_value_t = 300)]
    pub max_results: usize,

    /// Sort by URL instead of by latency
    #[arg(long)]
    pub no_rank: bool,

    /// HTTP status counted as alive (repeatable, replaces 200/400/403/404)
    #[arg(long = "alive-status", value_name = "CODE")]
    pub alive_statuses: Vec<u16>,

    /// One tracker per line, without the blank separator line
    #[arg(long)]
    pub compact: bool,

    /// Number of best trackers to log at the end
    #[arg(long, default_value_t = 10)]
    pub preview: usize,

    /// Retries per source list after the first failed download
    #[arg(long, default_value_t = 3)]
    pub fetch_retries: u32,

    /// Ignore HTTP(S)_PROXY when downloading lists
    #[arg(long)]
    pub no_proxy: bool,

    #[arg(long, value_enum, default_value_t = CliLogLevel::Info)]
    pub log_level: CliLogLevel,

    /// Also write a full trace log of the run into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> ScoutConfig {
        let mut config = ScoutConfig::default();

        if !self.sources.is_empty() {
            config.sources.urls = self.sources;
        }
        config.sources.retries = self.fetch_retries;
        config.sources.use_system_proxy = !self.no_proxy;

        config.probe.concurrency_limit = self.concurrency;
        config.probe.probe_timeout =
            Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::ZERO);
        config.probe.max_results = self.max_results;
        config.probe.rank_by_latency = !self.no_rank;
        config.probe.alive_statuses = if self.alive_statuses.is_empty() {
            DEFAULT_ALIVE_STATUSES.to_vec()
        } else {
            self.alive_statuses
        };

        config.output.path = self.output;
        config.output.blank_line_separator = !self.compact;
        config.output.preview = self.preview;

        config
    }
}
