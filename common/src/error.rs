use thiserror::Error;

/// Failures the scanner distinguishes between.
///
/// Only [`ScanError::InvalidAddress`] aborts a scan. Everything else is
/// contained in the worker that produced it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("'{0}' is not a valid IPv4 or IPv6 address")]
    InvalidAddress(String),

    /// The raw socket layer refused or failed an operation.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Transport(err.to_string())
    }
}
