//! Error types for IPSync
//!
//! Every failure the controller can observe falls into one of three
//! user-recoverable classes (configuration, remote rejection, transport),
//! plus storage failures raised by [`crate::ConfigStore`] implementations.

use thiserror::Error;

/// Result type alias for IPSync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for IPSync
#[derive(Error, Debug)]
pub enum Error {
    /// The endpoint could not be turned into a usable gateway
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The remote service answered with a non-success status
    #[error("remote rejected request with status {status}")]
    Rejected {
        /// HTTP status code returned by the service
        status: u16,
    },

    /// The request did not complete (DNS, connect, timeout, reset, unreadable body)
    #[error("transport failure: {0}")]
    Transport(String),

    /// Persisted configuration could not be written
    #[error("config store error: {0}")]
    ConfigStore(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or unusable endpoint
    Configuration,
    /// Non-success response from the remote service
    Rejected,
    /// No usable response at all
    Transport,
    /// Local persistence failure
    Storage,
}

impl Error {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(msg: impl Into<String>) -> Self {
        Self::InvalidEndpoint(msg.into())
    }

    /// Create a remote rejection error
    pub fn rejected(status: u16) -> Self {
        Self::Rejected { status }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a config store error
    pub fn config_store(msg: impl Into<String>) -> Self {
        Self::ConfigStore(msg.into())
    }

    /// Which recovery class this error belongs to
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidEndpoint(_) => ErrorClass::Configuration,
            Self::Rejected { .. } => ErrorClass::Rejected,
            Self::Transport(_) => ErrorClass::Transport,
            Self::ConfigStore(_) | Self::Json(_) => ErrorClass::Storage,
        }
    }
}
