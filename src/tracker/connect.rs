use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{Endpoint, Probe};
use crate::errors::ProbeError;

/// Transport-level check used for WebSocket trackers: the TCP connect
/// completing in time is the whole test, no bytes are exchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectProbe;

#[async_trait]
impl Probe for ConnectProbe {
    async fn probe(
        &self,
        endpoint: &Endpoint,
        timeout_duration: Duration,
    ) -> Result<Duration, ProbeError> {
        let started = Instant::now();
        let addr = (endpoint.host.as_str(), endpoint.port);
        match timeout(timeout_duration, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                let latency = started.elapsed();
                drop(stream);
                Ok(latency)
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_port_is_alive() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Endpoint::parse(&format!("ws://127.0.0.1:{port}")).unwrap();

        let result = ConnectProbe.probe(&endpoint, Duration::from_secs(2)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_closed_port_is_dead() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let endpoint = Endpoint::parse(&format!("ws://127.0.0.1:{port}")).unwrap();

        let result = ConnectProbe.probe(&endpoint, Duration::from_secs(2)).await;
        assert!(result.is_err());
    }
}
