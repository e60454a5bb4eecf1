use std::time::Duration;

use async_trait::async_trait;

use super::{connect::ConnectProbe, http::HttpProbe, udp::UdpProbe, Endpoint, Probe, Scheme};
use crate::config::ProbeConfig;
use crate::errors::ProbeError;

/// Routes each endpoint to the probe for its scheme.
pub struct TrackerProber {
    udp: UdpProbe,
    http: HttpProbe,
    connect: ConnectProbe,
}

impl TrackerProber {
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        Ok(Self {
            udp: UdpProbe,
            http: HttpProbe::new(config)?,
            connect: ConnectProbe,
        })
    }

    pub fn probe_for(&self, scheme: Scheme) -> &dyn Probe {
        match scheme {
            Scheme::Udp => &self.udp,
            Scheme::Http | Scheme::Https => &self.http,
            Scheme::Ws | Scheme::Wss => &self.connect,
        }
    }
}

#[async_trait]
impl Probe for TrackerProber {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Duration, ProbeError> {
        self.probe_for(endpoint.scheme).probe(endpoint, timeout).await
    }
}
