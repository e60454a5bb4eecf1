pub mod connect;
pub mod factory;
pub mod http;
pub mod udp;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use url::{Host, Url};

use crate::errors::ProbeError;

/// A single reachability check against one tracker endpoint.
///
/// Implementations open at most one socket per call and release it before
/// returning, whatever the result.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns the round-trip latency when the endpoint behaves like a live
    /// tracker.
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Duration, ProbeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    Udp,
    Http,
    Https,
    Ws,
    Wss,
}

impl Scheme {
    pub fn from_url_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "udp" => Some(Scheme::Udp),
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "ws" => Some(Scheme::Ws),
            "wss" => Some(Scheme::Wss),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Udp => "udp",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a candidate tracker lives, parsed out of its announce URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub url: Url,
    /// The candidate exactly as given, used to report the outcome
    pub candidate: String,
}

impl Endpoint {
    /// Parses a candidate URL, or `None` when it cannot be probed.
    ///
    /// UDP has no well-known tracker port, so a `udp://` URL without one is
    /// rejected. The web schemes fall back to their standard port, which the
    /// URL parser strips when written explicitly.
    pub fn parse(candidate: &str) -> Option<Self> {
        let url = Url::parse(candidate).ok()?;
        let scheme = Scheme::from_url_scheme(url.scheme())?;

        let host = match url.host()? {
            Host::Domain(domain) if !domain.is_empty() => domain.to_string(),
            Host::Ipv4(ip) => ip.to_string(),
            _ => return None,
        };

        let port = match scheme {
            Scheme::Udp => url.port()?,
            _ => url.port_or_known_default()?,
        };
        if port == 0 {
            return None;
        }

        Some(Self {
            scheme,
            host,
            port,
            url,
            candidate: candidate.to_string(),
        })
    }

    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
