//! Bounded fan-out of probes over the candidate set.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::errors::ProbeError;
use crate::outcome::ProbeOutcome;
use crate::tracker::{Endpoint, Probe};

/// Probes every endpoint once and returns one outcome per endpoint.
///
/// No more than `concurrency_limit` probes run at a time, clamped to what a
/// semaphore can hold. The dispatcher waits for a free slot before spawning
/// the next task. Each probe gets its own `per_probe_timeout`, and an expired
/// probe is dropped, closing its socket. Returns after the last probe has finished.
pub async fn run_all(
    probe: Arc<dyn Probe>,
    candidates: Vec<Endpoint>,
    concurrency_limit: usize,
    per_probe_timeout: Duration,
) -> Vec<ProbeOutcome> {
    let permits = concurrency_limit.clamp(1, Semaphore::MAX_PERMITS);
    let semaphore = Arc::new(Semaphore::new(permits));
    let mut join_set = JoinSet::new();
    let mut outcomes = Vec::with_capacity(candidates.len());
    let total = candidates.len();

    for endpoint in candidates {
        // never closed, so acquisition only fails if that changes
        let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
        let probe = Arc::clone(&probe);

        join_set.spawn(async move {
            let _permit = permit;
            let url = endpoint.candidate.clone();
            let result = probe_once(probe.as_ref(), &endpoint, per_probe_timeout).await;

            match &result {
                Ok(latency) => tracing::debug!(
                    "SUCCESS: {} ({:.1}ms)",
                    url,
                    latency.as_secs_f64() * 1000.0
                ),
                Err(e) => tracing::debug!("FAIL: {} ({})", url, e),
            }

            ProbeOutcome::from_result(url, &result)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        collect(joined, &mut outcomes);
    }

    tracing::trace!("Runner finished {}/{} probes", outcomes.len(), total);
    outcomes
}

async fn probe_once(
    probe: &dyn Probe,
    endpoint: &Endpoint,
    per_probe_timeout: Duration,
) -> Result<Duration, ProbeError> {
    let attempt = tokio::time::timeout(per_probe_timeout, probe.probe(endpoint, per_probe_timeout));

    match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(ProbeError::Timeout),
        Err(_panic) => Err(ProbeError::Panicked),
    }
}

fn collect(joined: Result<ProbeOutcome, tokio::task::JoinError>, outcomes: &mut Vec<ProbeOutcome>) {
    match joined {
        Ok(outcome) => outcomes.push(outcome),
        // tasks are never aborted and panics are caught inside the task
        Err(e) => tracing::warn!("Probe task join error: {}", e),
    }
}
