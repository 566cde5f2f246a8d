//! Transport-agnostic async HTTP client
//!
//! Provides one request/response contract over any native HTTP stack, with bodies
//! delivered either fully buffered or as a lazy byte stream that can be decoded into
//! text lines.
//!
//! ## Features
//!
//! - **Pluggable transports**: implement [`Transport`] for any HTTP stack
//! - **Buffered bodies**: [`AsyncHttp::data`] drains the body up to a configurable cap
//! - **Streamed bodies**: [`AsyncHttp::bytes`] yields a [`ByteStream`] with a
//!   [`lines`](ByteStream::lines) view that handles CRLF and chunk boundaries
//! - **Interception**: rewrite native requests and final results via [`Interceptor`]
//! - **Testing support**: the `mock` feature provides a scriptable `MockTransport`

pub mod assembler;
pub mod byte_stream;
pub mod chunk;
pub mod client;
pub mod config;
pub mod error;
pub mod intercept;
pub mod lines;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod request;
pub mod response;
pub mod transport;

pub use byte_stream::{ByteStream, ResponseBytes};
pub use chunk::ChunkSource;
pub use client::AsyncHttp;
pub use config::{ClientConfig, DEFAULT_MAX_BODY_SIZE};
pub use error::{BoxError, Error, Result};
pub use intercept::{Interceptor, PassThrough};
pub use lines::{ByteSequenceExt, LineDecoder, Lines};
pub use request::{Method, Request};
pub use response::{BodyMode, Headers, HttpHead, Response, ResponseBody, ResponseHead};
pub use transport::{Transport, TransportBody};

/// Re-export of the chunk type
pub use bytes::Bytes;
