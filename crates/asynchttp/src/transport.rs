//! Transport abstraction

use async_trait::async_trait;
use bytes::Bytes;

use crate::{chunk::ChunkSource, error::BoxError, request::Request, response::ResponseHead};

/// Body as delivered by a transport
#[derive(Debug)]
pub enum TransportBody {
    /// The transport already read the whole body
    Complete(Bytes),
    /// The body still has to be pulled chunk by chunk
    Chunked(ChunkSource),
}

impl From<Bytes> for TransportBody {
    fn from(bytes: Bytes) -> Self {
        TransportBody::Complete(bytes)
    }
}

impl From<ChunkSource> for TransportBody {
    fn from(source: ChunkSource) -> Self {
        TransportBody::Chunked(source)
    }
}

/// A native HTTP stack the client can drive
///
/// Implementations own connection management, TLS, timeouts and redirects.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The transport's own request type
    type Native: Send;

    /// Build the native request for `request`
    fn prepare(&self, request: &Request) -> Result<Self::Native, BoxError>;

    /// Execute a request whose body will be buffered by the caller
    async fn execute(
        &self,
        request: Self::Native,
    ) -> Result<(ResponseHead, TransportBody), BoxError>;

    /// Execute a request whose body will be consumed incrementally
    async fn execute_streaming(
        &self,
        request: Self::Native,
    ) -> Result<(ResponseHead, ChunkSource), BoxError>;

    /// Release every resource held by the transport
    async fn shutdown(&self) -> Result<(), BoxError> {
        Ok(())
    }
}
