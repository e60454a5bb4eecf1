use std::time::Duration;

use crate::errors::ProbeError;

/// What one probe found out about one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub url: String,
    pub reachable: bool,
    pub latency_ms: Option<f64>,
}

impl ProbeOutcome {
    pub fn alive(url: impl Into<String>, latency: Duration) -> Self {
        Self {
            url: url.into(),
            reachable: true,
            latency_ms: Some(latency.as_secs_f64() * 1000.0),
        }
    }

    pub fn dead(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reachable: false,
            latency_ms: None,
        }
    }

    pub fn from_result(url: impl Into<String>, result: &Result<Duration, ProbeError>) -> Self {
        match result {
            Ok(latency) => Self::alive(url, *latency),
            Err(_) => Self::dead(url),
        }
    }
}

/// An alive tracker in the final, ranked list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTracker {
    pub url: String,
    pub latency_ms: Option<f64>,
}
