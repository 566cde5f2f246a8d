//! Client error types

use thiserror::Error;

use crate::request::Request;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by transports and interceptors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`AsyncHttp`](crate::AsyncHttp)
///
/// Every variant that concerns a particular request carries that request, so the
/// method and URL are always available through [`Error::failed_request`].
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed to execute the request or to deliver its body
    #[error("Network request failed to execute: {request}")]
    NetworkRequestFailed {
        request: Box<Request>,
        #[source]
        source: BoxError,
    },

    /// A streaming request produced no chunks at all
    #[error("Response stream contains no data for request: {request}")]
    ResponseStreamEmpty { request: Box<Request> },

    /// The transport returned something that is not an HTTP response
    #[error("Invalid response type for request {request}: expected an HTTP response, got {received}")]
    InvalidResponse {
        received: String,
        request: Box<Request>,
    },

    /// A buffered body grew past the configured cap
    #[error("Response body for {request} exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize, request: Box<Request> },

    /// The transport could not turn the request into its native form
    #[error("Failed to prepare request {request}")]
    Transport {
        request: Box<Request>,
        #[source]
        source: BoxError,
    },

    /// The interceptor rejected the request or its result
    #[error("Interceptor failed for request {request}")]
    Intercept {
        request: Box<Request>,
        #[source]
        source: BoxError,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request body serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client was used after its transport shut down
    #[error("Transport has been shut down")]
    ShutDown,

    /// The transport reported a failure while shutting down
    #[error("Transport shutdown failed")]
    ShutdownFailed(#[source] BoxError),
}

impl Error {
    pub(crate) fn network(request: &Request, source: impl Into<BoxError>) -> Self {
        Error::NetworkRequestFailed {
            request: Box::new(request.clone()),
            source: source.into(),
        }
    }

    pub(crate) fn stream_empty(request: &Request) -> Self {
        Error::ResponseStreamEmpty {
            request: Box::new(request.clone()),
        }
    }

    pub(crate) fn invalid_response(request: &Request, received: impl Into<String>) -> Self {
        Error::InvalidResponse {
            received: received.into(),
            request: Box::new(request.clone()),
        }
    }

    pub(crate) fn body_too_large(request: &Request, limit: usize) -> Self {
        Error::BodyTooLarge {
            limit,
            request: Box::new(request.clone()),
        }
    }

    pub(crate) fn transport(request: &Request, source: BoxError) -> Self {
        Error::Transport {
            request: Box::new(request.clone()),
            source,
        }
    }

    pub(crate) fn intercept(request: &Request, source: BoxError) -> Self {
        Error::Intercept {
            request: Box::new(request.clone()),
            source,
        }
    }

    /// The request that caused this error, if the error concerns one
    pub fn failed_request(&self) -> Option<&Request> {
        match self {
            Error::NetworkRequestFailed { request, .. }
            | Error::ResponseStreamEmpty { request }
            | Error::InvalidResponse { request, .. }
            | Error::BodyTooLarge { request, .. }
            | Error::Transport { request, .. }
            | Error::Intercept { request, .. } => Some(request),
            Error::Config(_)
            | Error::InvalidUrl(_)
            | Error::Serialization(_)
            | Error::ShutDown
            | Error::ShutdownFailed(_) => None,
        }
    }

    /// Check if the error came from the network layer
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkRequestFailed { .. })
    }
}
