use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::{Endpoint, Probe};
use crate::config::ProbeConfig;
use crate::errors::ProbeError;

const DUMMY_INFO_HASH: &[u8; 20] = b"01234567890123456789";
const DUMMY_PEER_ID: &[u8; 20] = b"-PC0001-012345678900";
const DUMMY_PORT: u16 = 6881;

/// Sends a dummy announce and judges liveness from the status code alone.
pub struct HttpProbe {
    client: Client,
    alive_statuses: Vec<u16>,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        // no idle pool: every probe gets, and then closes, its own connection
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.probe_timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::limited(5))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            alive_statuses: config.alive_statuses.clone(),
        })
    }

    pub fn is_alive_status(&self, status: u16) -> bool {
        self.alive_statuses.contains(&status)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Duration, ProbeError> {
        let url = build_announce_url(endpoint.url.as_str());

        let started = Instant::now();
        let response = self.client.get(&url).timeout(timeout).send().await?;
        let latency = started.elapsed();

        let status = response.status().as_u16();
        drop(response);

        if self.is_alive_status(status) {
            Ok(latency)
        } else {
            Err(ProbeError::RejectedStatus(status))
        }
    }
}

/// Appends the dummy announce query, keeping any query the tracker URL
/// already carries (passkeys and the like).
pub fn build_announce_url(announce_url: &str) -> String {
    let info_hash = urlencoding::encode_binary(DUMMY_INFO_HASH);
    let peer_id = urlencoding::encode_binary(DUMMY_PEER_ID);
    let separator = if announce_url.contains('?') { '&' } else { '?' };

    format!(
        "{}{}info_hash={}&peer_id={}&port={}&uploaded=0&downloaded=0&left=0&compact=1",
        announce_url, separator, info_hash, peer_id, DUMMY_PORT
    )
}
