use thiserror::Error;

/// Why a single probe did not prove the tracker alive.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to resolve {0}")]
    Resolve(String),

    #[error("Probe timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Datagram too short: {0} bytes")]
    ShortDatagram(usize),

    #[error("Unexpected action {0} in connect response")]
    UnexpectedAction(u32),

    #[error("Transaction ID mismatch: sent {sent:#010x}, received {received:#010x}")]
    TransactionMismatch { sent: u32, received: u32 },

    #[error("Tracker answered with status {0}")]
    RejectedStatus(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Probe task panicked")]
    Panicked,
}

/// Run-level failures surfaced to the caller.
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("No tracker candidates to test")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
