//! Transport-agnostic request description

use std::{collections::BTreeMap, fmt, str::FromStr};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Content type used when a request does not set one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Trace,
    Options,
    Connect,
}

impl Method {
    /// All supported methods
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Head,
        Method::Patch,
        Method::Trace,
        Method::Options,
        Method::Connect,
    ];

    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("unknown HTTP method: {s}")))
    }
}

/// An HTTP request as seen by the client
///
/// The transport turns this into its own native request type; see
/// [`Transport::prepare`](crate::Transport::prepare).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
    pub content_type: String,
}

impl Request {
    /// Create a request for an already parsed URL
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Parse `url` and create a request for it
    pub fn parse(method: Method, url: &str) -> Result<Self> {
        Ok(Self::new(method, Url::parse(url)?))
    }

    /// Create a GET request
    pub fn get(url: &str) -> Result<Self> {
        Self::parse(Method::Get, url)
    }

    /// Create a POST request
    pub fn post(url: &str) -> Result<Self> {
        Self::parse(Method::Post, url)
    }

    /// Create a PUT request
    pub fn put(url: &str) -> Result<Self> {
        Self::parse(Method::Put, url)
    }

    /// Create a DELETE request
    pub fn delete(url: &str) -> Result<Self> {
        Self::parse(Method::Delete, url)
    }

    /// Create a HEAD request
    pub fn head(url: &str) -> Result<Self> {
        Self::parse(Method::Head, url)
    }

    /// Create a PATCH request
    pub fn patch(url: &str) -> Result<Self> {
        Self::parse(Method::Patch, url)
    }

    /// Add or replace a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a UTF-8 text body with a `text/plain` content type
    pub fn text_body(self, text: impl Into<String>) -> Self {
        self.body(text.into()).content_type("text/plain; charset=utf-8")
    }

    /// Serialize `value` as the JSON body
    pub fn json_body<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.body(body).content_type("application/json"))
    }

    /// Set the content type sent with the request
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
