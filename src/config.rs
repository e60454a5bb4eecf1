//! Tunable settings for a scouting run.
//!
//! Every default lives here so the probe, source and output layers never
//! carry their own magic numbers.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::errors::ScoutError;

/// Lists fetched when no `--source` is given.
pub const DEFAULT_SOURCES: &[&str] = &[
    "https://raw.githubusercontent.com/ngosang/trackerslist/master/trackers_best.txt",
    "https://raw.githubusercontent.com/ngosang/trackerslist/refs/heads/master/trackers_best_ip.txt",
    "https://raw.githubusercontent.com/XIU2/TrackersListCollection/master/best.txt",
    "https://raw.githubusercontent.com/adysec/tracker/main/trackers_best.txt",
    "https://raw.githubusercontent.com/pkgforge-security/Trackers/main/trackers_stable.txt",
    "https://raw.githubusercontent.com/scriptzteam/BitTorrent-Tracker-List/main/trackers_best.txt",
    "https://raw.githubusercontent.com/scriptzteam/BitTorrent-Tracker-List/refs/heads/main/trackers_best_ip.txt",
    "https://newtrackon.com/api/stable?include_ipv4_only_trackers=true&include_ipv6_only_trackers=false",
    "https://trackers.run/s/rw_ws_up_hp_hs_v4.txt",
];

/// HTTP statuses that still prove a tracker is up, even when it rejects the
/// dummy announce.
pub const DEFAULT_ALIVE_STATUSES: &[u16] = &[200, 400, 403, 404];

#[derive(Debug, Clone, Default)]
pub struct ScoutConfig {
    pub probe: ProbeConfig,
    pub sources: SourceConfig,
    pub output: OutputConfig,
}

impl ScoutConfig {
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.probe.concurrency_limit == 0 {
            return Err(ScoutError::InvalidConfig(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        if self.probe.concurrency_limit > Semaphore::MAX_PERMITS {
            return Err(ScoutError::InvalidConfig(format!(
                "concurrency limit must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.probe.probe_timeout.is_zero() {
            return Err(ScoutError::InvalidConfig(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        if self.sources.urls.is_empty() {
            return Err(ScoutError::InvalidConfig(
                "at least one source list is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reachability testing parameters.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Maximum probes in flight at once
    pub concurrency_limit: usize,
    /// Deadline for a single probe, DNS included
    pub probe_timeout: Duration,
    /// Output cap, 0 means unlimited
    pub max_results: usize,
    /// Sort alive trackers by latency instead of by URL
    pub rank_by_latency: bool,
    pub alive_statuses: Vec<u16>,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 500,
            probe_timeout: Duration::from_secs(5),
            max_results: 300,
            rank_by_latency: true,
            alive_statuses: DEFAULT_ALIVE_STATUSES.to_vec(),
            user_agent: concat!("tracker-scout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Remote tracker list retrieval.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub urls: Vec<String>,
    pub fetch_timeout: Duration,
    /// Extra attempts after the first failure
    pub retries: u32,
    /// Delay before the first retry, doubled on each further one
    pub retry_backoff: Duration,
    /// Honour `HTTP(S)_PROXY` when downloading lists
    pub use_system_proxy: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            fetch_timeout: Duration::from_secs(15),
            retries: 3,
            retry_backoff: Duration::from_millis(500),
            use_system_proxy: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Put an empty line between trackers (qBittorrent list format)
    pub blank_line_separator: bool,
    /// How many of the best trackers to log after the run
    pub preview: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("best.txt"),
            blank_line_separator: true,
            preview: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe.alive_statuses, vec![200, 400, 403, 404]);
        assert_eq!(config.sources.urls.len(), DEFAULT_SOURCES.len());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = ScoutConfig::default();
        config.probe.concurrency_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ScoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_concurrency_above_semaphore_capacity_rejected() {
        let mut config = ScoutConfig::default();
        config.probe.concurrency_limit = Semaphore::MAX_PERMITS;
        assert!(config.validate().is_ok());

        config.probe.concurrency_limit = usize::MAX;
        assert!(matches!(
            config.validate(),
            Err(ScoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ScoutConfig::default();
        config.probe.probe_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
