//! One end-to-end scouting run over a prepared candidate set.

use std::sync::Arc;

use crate::aggregator::aggregate;
use crate::config::ProbeConfig;
use crate::errors::ScoutError;
use crate::outcome::RankedTracker;
use crate::runner::run_all;
use crate::tracker::{Endpoint, Probe};

pub struct Orchestrator {
    probe: Arc<dyn Probe>,
    config: ProbeConfig,
}

impl Orchestrator {
    pub fn new(probe: Arc<dyn Probe>, config: ProbeConfig) -> Self {
        Self { probe, config }
    }

    /// Probes every candidate and returns the ranked list of alive trackers.
    ///
    /// # Errors
    ///
    /// - `ScoutError::EmptyInput` - no candidates, or none that parse into a
    ///   probeable endpoint. Callers should stop without writing output.
    pub async fn orchestrate(
        &self,
        candidates: &[String],
    ) -> Result<Vec<RankedTracker>, ScoutError> {
        if candidates.is_empty() {
            return Err(ScoutError::EmptyInput);
        }

        let endpoints: Vec<Endpoint> = candidates
            .iter()
            .filter_map(|candidate| {
                let endpoint = Endpoint::parse(candidate);
                if endpoint.is_none() {
                    tracing::debug!("Dropping unprobeable candidate {}", candidate);
                }
                endpoint
            })
            .collect();

        if endpoints.is_empty() {
            return Err(ScoutError::EmptyInput);
        }

        let tested = endpoints.len();
        tracing::info!(
            "Testing {} trackers ({} concurrent, {:?} timeout)",
            tested,
            self.config.concurrency_limit,
            self.config.probe_timeout
        );

        let outcomes = run_all(
            Arc::clone(&self.probe),
            endpoints,
            self.config.concurrency_limit,
            self.config.probe_timeout,
        )
        .await;

        let alive = outcomes.iter().filter(|o| o.reachable).count();
        tracing::info!(
            "Collected: {}, tested: {}, alive: {}",
            candidates.len(),
            tested,
            alive
        );
        if alive == 0 {
            tracing::warn!("No tracker answered; the result list is empty");
        }

        Ok(aggregate(
            outcomes,
            self.config.max_results,
            self.config.rank_by_latency,
        ))
    }
}
