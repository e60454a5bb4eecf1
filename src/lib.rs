pub mod aggregator;
pub mod cli;
pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod outcome;
pub mod output;
pub mod parsing;
pub mod runner;
pub mod sources;
pub mod tracing_setup;
pub mod tracker;

pub use aggregator::aggregate;
pub use errors::{ProbeError, ScoutError};
pub use orchestrator::Orchestrator;
pub use outcome::{ProbeOutcome, RankedTracker};
pub use runner::run_all;
pub use tracker::{factory::TrackerProber, Endpoint, Probe, Scheme};
