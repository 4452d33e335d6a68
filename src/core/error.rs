//! Crate-level error type.

use thiserror::Error;

use crate::domains::tools::DuplicateToolError;

use super::transport::TransportError;

/// A specialized Result type for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a server session or abort startup. Per-call
/// failures never surface here; the dispatcher turns those into failure
/// outcomes on the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport stream failed unrecoverably.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Tool registration conflict at startup.
    #[error("Registry error: {0}")]
    Registry(#[from] DuplicateToolError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session lifecycle contract was violated.
    #[error("Session error: {0}")]
    Session(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
