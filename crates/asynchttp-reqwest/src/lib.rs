//! reqwest transport for `asynchttp`
//!
//! Plugs a `reqwest::Client` into [`asynchttp::AsyncHttp`]. Timeouts, user agent
//! and proxy are handed to reqwest unchanged; bodies are streamed back as chunks
//! so the client's buffering cap and cancellation rules apply.

pub mod client;
pub mod config;
pub mod error;

pub use client::{async_http, ReqwestTransport};
pub use config::ReqwestConfig;
pub use error::{ReqwestError, Result};
