//! Downloading the public tracker lists.

use std::time::Duration;

use reqwest::Client;

use crate::config::SourceConfig;

pub struct SourceFetcher {
    client: Client,
    retries: u32,
    retry_backoff: Duration,
}

impl SourceFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().timeout(config.fetch_timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            retries: config.retries,
            retry_backoff: config.retry_backoff,
        })
    }

    /// Fetches every source and returns all of their lines. A source that
    /// keeps failing is logged and skipped.
    pub async fn fetch_all(&self, sources: &[String]) -> Vec<String> {
        tracing::info!("Downloading {} tracker lists...", sources.len());

        let mut lines = Vec::new();
        for source in sources {
            match self.fetch_with_retry(source).await {
                Ok(body) => {
                    let before = lines.len();
                    lines.extend(body.lines().map(str::to_string));
                    tracing::debug!("Fetched {} lines from {}", lines.len() - before, source);
                }
                Err(e) => tracing::error!("Could not download source {}: {}", source, e),
            }
        }
        lines
    }

    pub async fn fetch_with_retry(&self, source: &str) -> Result<String, reqwest::Error> {
        let mut attempt = 0;
        loop {
            match self.fetch(source).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retries => {
                    let delay = backoff_delay(self.retry_backoff, attempt);
                    tracing::warn!(
                        "Fetching {} failed ({}), retrying in {:?}",
                        source,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch(&self, source: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(source).send().await?.error_for_status()?;
        response.text().await
    }
}

/// `base`, then doubling per attempt.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
