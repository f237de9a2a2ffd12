//! Error types for breeze-core

use thiserror::Error;

/// Result type alias using breeze-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in breeze-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No response arrived: DNS, connect, or dropped socket
    #[error("Network error: {0}")]
    Network(String),

    /// A response arrived carrying an application-level failure
    #[error("Server error: {0}")]
    Server(String),

    /// Credentials rejected by the login or signup mutation
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Local input validation failure, reported before any request is sent
    #[error("{0}")]
    Validation(String),

    /// A protected operation was invoked without an attached session
    #[error("No active session")]
    NoSession,

    /// Durable storage read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True when the failure never left the device.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NoSession | Self::Storage(_) | Self::Serialization(_)
        )
    }
}
