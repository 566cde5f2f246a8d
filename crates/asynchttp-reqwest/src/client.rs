//! reqwest-backed transport

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use asynchttp::{
    AsyncHttp, BoxError, ChunkSource, HttpHead, Request, ResponseHead, Transport, TransportBody,
};
use futures::TryStreamExt;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use crate::{
    config::ReqwestConfig,
    error::{ReqwestError, Result},
};

/// [`Transport`] over a `reqwest::Client`
///
/// Bodies are always handed to the client as chunk sources, so buffered requests
/// are capped while they are read instead of after reqwest has collected them.
pub struct ReqwestTransport {
    inner: reqwest::Client,
    config: ReqwestConfig,
    shut_down: AtomicBool,
}

impl ReqwestTransport {
    /// Create a transport with configuration
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ReqwestError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| ReqwestError::BuildError(e.to_string()))?;

        Ok(Self {
            inner,
            config,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Create a transport with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(ReqwestConfig::default())
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get configuration
    pub fn config(&self) -> &ReqwestConfig {
        &self.config
    }

    fn ensure_open(&self) -> std::result::Result<(), BoxError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ReqwestError::ShutDown.into());
        }
        Ok(())
    }

    async fn send(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<(ResponseHead, ChunkSource), BoxError> {
        self.ensure_open()?;
        debug!("HTTP {}: {}", request.method(), request.url());

        let response = self.inner.execute(request).await?;
        let head = head_of(&response);
        let source = ChunkSource::new(response.bytes_stream().map_err(BoxError::from));
        Ok((head.into(), source))
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let invalid = |message: String| ReqwestError::InvalidHeader {
        name: name.to_string(),
        message,
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

fn head_of(response: &reqwest::Response) -> HttpHead {
    let mut head = HttpHead::new(response.status().as_u16()).url(response.url().clone());
    for (name, value) in response.headers() {
        head = head.header(name.as_str(), value.as_bytes());
    }
    head
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Native = reqwest::Request;

    fn prepare(&self, request: &Request) -> std::result::Result<reqwest::Request, BoxError> {
        self.ensure_open()?;

        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())?;
        let mut native = reqwest::Request::new(method, request.url.clone());

        let headers = native.headers_mut();
        for (name, value) in &request.headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }
        let (_, content_type) = header_pair(CONTENT_TYPE.as_str(), &request.content_type)?;
        headers.insert(CONTENT_TYPE, content_type);

        if let Some(body) = &request.body {
            *native.body_mut() = Some(body.clone().into());
        }
        Ok(native)
    }

    async fn execute(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<(ResponseHead, TransportBody), BoxError> {
        let (head, source) = self.send(request).await?;
        Ok((head, source.into()))
    }

    async fn execute_streaming(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<(ResponseHead, ChunkSource), BoxError> {
        self.send(request).await
    }

    async fn shutdown(&self) -> std::result::Result<(), BoxError> {
        debug!("Shutting down reqwest transport");
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}

/// Create a client over a reqwest transport
pub fn async_http(config: ReqwestConfig) -> Result<AsyncHttp<ReqwestTransport>> {
    Ok(AsyncHttp::new(ReqwestTransport::new(config)?))
}
