//! Transport error types

use thiserror::Error;

/// Result type for transport setup
pub type Result<T> = std::result::Result<T, ReqwestError>;

/// Errors raised by [`ReqwestTransport`](crate::ReqwestTransport) itself
///
/// Failures reported by reqwest while a request runs are passed through unchanged
/// as `reqwest::Error`.
#[derive(Debug, Error)]
pub enum ReqwestError {
    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),

    /// A header name or value reqwest cannot send
    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    /// The transport was used after shutdown
    #[error("Transport has been shut down")]
    ShutDown,
}
