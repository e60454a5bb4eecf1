use std::net::SocketAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

use super::{Endpoint, Probe};
use crate::errors::ProbeError;

/// BEP 15 magic constant sent as the connection id of a connect request.
pub const PROTOCOL_ID: u64 = 0x41727101980;
pub const ACTION_CONNECT: u32 = 0;
pub const CONNECT_PACKET_LEN: usize = 16;

/// BEP 15 connect handshake; the returned connection id is not used.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpProbe;

#[async_trait]
impl Probe for UdpProbe {
    async fn probe(
        &self,
        endpoint: &Endpoint,
        timeout_duration: Duration,
    ) -> Result<Duration, ProbeError> {
        let deadline = Instant::now() + timeout_duration;

        let addr = timeout(timeout_duration, resolve(endpoint))
            .await
            .map_err(|_| ProbeError::Timeout)??;

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(addr).await?;

        let transaction_id: u32 = rand::thread_rng().gen();
        let request = ConnectRequest::new(transaction_id);
        socket.send(&request.to_bytes()).await?;

        let mut state = ConnectState::AwaitingResponse {
            transaction_id,
            sent_at: Instant::now(),
        };

        let mut response = [0u8; 2048];
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, socket.recv(&mut response)).await {
            Ok(Ok(size)) => state = state.on_datagram(&response[..size], Instant::now()),
            Ok(Err(e)) => state = ConnectState::Done(Err(e.into())),
            Err(_) => state = state.on_timeout(),
        }

        match state {
            ConnectState::Done(result) => result,
            ConnectState::AwaitingResponse { .. } => Err(ProbeError::Timeout),
        }
    }
}

async fn resolve(endpoint: &Endpoint) -> Result<SocketAddr, ProbeError> {
    lookup_host((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|_| ProbeError::Resolve(endpoint.authority()))?
        .next()
        .ok_or_else(|| ProbeError::Resolve(endpoint.authority()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    pub transaction_id: u32,
}

impl ConnectRequest {
    pub fn new(transaction_id: u32) -> Self {
        Self { transaction_id }
    }

    pub fn to_bytes(&self) -> [u8; CONNECT_PACKET_LEN] {
        let mut request = [0u8; CONNECT_PACKET_LEN];
        request[0..8].copy_from_slice(&PROTOCOL_ID.to_be_bytes());
        request[8..12].copy_from_slice(&ACTION_CONNECT.to_be_bytes());
        request[12..16].copy_from_slice(&self.transaction_id.to_be_bytes());
        request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    pub action: u32,
    pub transaction_id: u32,
    pub connection_id: u64,
}

impl ConnectResponse {
    /// Decodes the first 16 bytes; anything after them is ignored.
    pub fn parse(datagram: &[u8]) -> Result<Self, ProbeError> {
        if datagram.len() < CONNECT_PACKET_LEN {
            return Err(ProbeError::ShortDatagram(datagram.len()));
        }

        let action = u32::from_be_bytes([datagram[0], datagram[1], datagram[2], datagram[3]]);
        let transaction_id =
            u32::from_be_bytes([datagram[4], datagram[5], datagram[6], datagram[7]]);
        let mut connection_id = [0u8; 8];
        connection_id.copy_from_slice(&datagram[8..16]);

        Ok(Self {
            action,
            transaction_id,
            connection_id: u64::from_be_bytes(connection_id),
        })
    }

    /// Checks the reply against the request it claims to answer.
    pub fn validate(&self, sent_transaction_id: u32) -> Result<(), ProbeError> {
        if self.action != ACTION_CONNECT {
            return Err(ProbeError::UnexpectedAction(self.action));
        }
        if self.transaction_id != sent_transaction_id {
            return Err(ProbeError::TransactionMismatch {
                sent: sent_transaction_id,
                received: self.transaction_id,
            });
        }
        Ok(())
    }
}

/// Handshake progress for one connect attempt. A single datagram or the
/// timer moves it to `Done`.
#[derive(Debug)]
pub enum ConnectState {
    AwaitingResponse { transaction_id: u32, sent_at: Instant },
    Done(Result<Duration, ProbeError>),
}

impl ConnectState {
    pub fn on_datagram(self, datagram: &[u8], received_at: Instant) -> Self {
        match self {
            ConnectState::AwaitingResponse {
                transaction_id,
                sent_at,
            } => {
                let result = ConnectResponse::parse(datagram)
                    .and_then(|response| response.validate(transaction_id))
                    .map(|()| received_at.saturating_duration_since(sent_at));
                ConnectState::Done(result)
            }
            done => done,
        }
    }

    pub fn on_timeout(self) -> Self {
        match self {
            ConnectState::AwaitingResponse { .. } => ConnectState::Done(Err(ProbeError::Timeout)),
            done => done,
        }
    }
}
