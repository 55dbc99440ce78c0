//! API error types.

use thiserror::Error;

/// API server error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured host and port do not form a socket address.
    #[error("Invalid listen address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
