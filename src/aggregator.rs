use std::cmp::Ordering;
use std::collections::HashMap;

use crate::outcome::{ProbeOutcome, RankedTracker};

/// Turns raw outcomes into the final list: alive only, one entry per URL,
/// ranked, capped at `max_results` (0 keeps everything).
///
/// The order depends only on the set of alive outcomes, never on the order
/// they arrived in. Latency ties, and the whole list when
/// `rank_by_latency` is off, fall back to URL order.
pub fn aggregate(
    outcomes: Vec<ProbeOutcome>,
    max_results: usize,
    rank_by_latency: bool,
) -> Vec<RankedTracker> {
    let mut best: HashMap<String, Option<f64>> = HashMap::new();
    for outcome in outcomes.into_iter().filter(|o| o.reachable) {
        best.entry(outcome.url)
            .and_modify(|latency| {
                if compare_latency(outcome.latency_ms, *latency) == Ordering::Less {
                    *latency = outcome.latency_ms;
                }
            })
            .or_insert(outcome.latency_ms);
    }

    let mut ranked: Vec<RankedTracker> = best
        .into_iter()
        .map(|(url, latency_ms)| RankedTracker { url, latency_ms })
        .collect();

    if rank_by_latency {
        ranked.sort_by(|a, b| {
            compare_latency(a.latency_ms, b.latency_ms).then_with(|| a.url.cmp(&b.url))
        });
    } else {
        ranked.sort_by(|a, b| a.url.cmp(&b.url));
    }

    if max_results > 0 {
        ranked.truncate(max_results);
    }
    ranked
}

/// Measured latencies ascending, unmeasured ones last.
fn compare_latency(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
