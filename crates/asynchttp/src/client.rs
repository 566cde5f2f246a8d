//! The client entry point

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use tracing::debug;

use crate::{
    assembler,
    byte_stream::ResponseBytes,
    config::ClientConfig,
    error::{Error, Result},
    intercept::{Interceptor, PassThrough},
    request::Request,
    response::{BodyMode, Response, ResponseBody},
    transport::Transport,
};

/// Async HTTP client over a pluggable [`Transport`]
///
/// Each call to [`data`](Self::data), [`bytes`](Self::bytes) or
/// [`fetch`](Self::fetch) runs one request to one outcome; nothing is retried. The
/// client shares no mutable state between requests, so it can be used from many
/// tasks at once behind an `Arc`.
pub struct AsyncHttp<T: Transport> {
    transport: T,
    config: ClientConfig,
    interceptor: Arc<dyn Interceptor<T::Native>>,
    shut_down: AtomicBool,
}

impl<T: Transport> AsyncHttp<T> {
    /// Create a client with the default configuration
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: ClientConfig::default(),
            interceptor: Arc::new(PassThrough),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Create a client with a validated configuration
    pub fn with_config(transport: T, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(transport)
        })
    }

    /// Install an interceptor, replacing the current one
    pub fn with_interceptor(mut self, interceptor: impl Interceptor<T::Native> + 'static) -> Self {
        self.interceptor = Arc::new(interceptor);
        self
    }

    /// Get configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `request` and buffer the whole body
    pub async fn data(&self, request: &Request) -> Result<(Bytes, Response)> {
        let native = self.prepare(request)?;
        debug!("HTTP {}", request);

        let (head, body) = self
            .transport
            .execute(native)
            .await
            .map_err(|e| Error::network(request, e))?;

        let response = assembler::envelope(&head, request)?;
        let data = assembler::drain(body, self.config.max_body_size, request).await?;
        debug!(
            status = response.status_code,
            len = data.len(),
            "HTTP {} completed",
            request
        );

        self.interceptor
            .intercept_data(&head, data, response)
            .map_err(|e| Error::intercept(request, e))
    }

    /// Execute `request` and return its body as a byte stream
    ///
    /// Returns once the first chunk has arrived. Dropping the stream releases the
    /// connection.
    pub async fn bytes(&self, request: &Request) -> Result<(ResponseBytes, Response)> {
        let native = self.prepare(request)?;
        debug!("HTTP {} (streaming)", request);

        let (head, source) = self
            .transport
            .execute_streaming(native)
            .await
            .map_err(|e| Error::network(request, e))?;

        let response = assembler::envelope(&head, request)?;
        let stream = assembler::open_stream(source, self.config.allow_empty_stream, request).await?;
        debug!(status = response.status_code, "HTTP {} streaming", request);

        self.interceptor
            .intercept_stream(&head, stream, response)
            .map_err(|e| Error::intercept(request, e))
    }

    /// Execute `request` with the body delivered in `mode`
    pub async fn fetch(
        &self,
        request: &Request,
        mode: BodyMode,
    ) -> Result<(ResponseBody, Response)> {
        match mode {
            BodyMode::Buffered => {
                let (data, response) = self.data(request).await?;
                Ok((ResponseBody::Buffered(data), response))
            }
            BodyMode::Streamed => {
                let (stream, response) = self.bytes(request).await?;
                Ok((ResponseBody::Streamed(stream), response))
            }
        }
    }

    /// Shut the transport down
    ///
    /// Later requests fail with [`Error::ShutDown`]. Streams already handed out keep
    /// their own connections until they are dropped.
    pub async fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("Shutting down transport");
        self.transport.shutdown().await.map_err(Error::ShutdownFailed)
    }

    /// True once `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn prepare(&self, request: &Request) -> Result<T::Native> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(Error::ShutDown);
        }

        let native = self
            .transport
            .prepare(request)
            .map_err(|e| Error::transport(request, e))?;

        self.interceptor
            .intercept_request(request, native)
            .map_err(|e| Error::intercept(request, e))
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for AsyncHttp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHttp")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish()
    }
}
