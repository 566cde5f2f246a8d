//! Response envelope and native response metadata

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::byte_stream::ResponseBytes;

/// Single-valued, case-preserving header map
///
/// Names compare ASCII case-insensitively. Inserting a name that is already present
/// replaces its value (last value wins) and adopts the casing of the newer name,
/// while the entry keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => {
                let (old_name, old_value) = &mut self.entries[index];
                *old_name = name;
                Some(std::mem::replace(old_value, value))
            }
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    /// Case-insensitive presence check
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    /// Number of distinct header names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no headers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl<N: Into<String>, V: Into<String>> Extend<(N, V)> for Headers {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl From<Vec<(String, String)>> for Headers {
    fn from(entries: Vec<(String, String)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Headers> for Vec<(String, String)> {
    fn from(headers: Headers) -> Self {
        headers.entries
    }
}

/// Transport-agnostic response metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    pub url: Option<Url>,
    pub headers: Headers,
}

impl Response {
    /// Create an envelope with no URL or headers
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            url: None,
            headers: Headers::new(),
        }
    }

    /// Set the final URL
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Add or replace a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Shorthand for a case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// True for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Response metadata exactly as a transport reports it
///
/// Header values are kept as raw bytes and may repeat; the assembler normalizes
/// them into [`Headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseHead {
    Http(HttpHead),
    /// A transport answered with something that is not an HTTP response,
    /// for example a `file:` or `data:` URL loader
    Other { kind: String, url: Option<Url> },
}

/// Raw HTTP response metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHead {
    pub status: u16,
    pub url: Option<Url>,
    pub headers: Vec<(String, Vec<u8>)>,
}

impl HttpHead {
    /// Create a head with no URL or headers
    pub fn new(status: u16) -> Self {
        Self {
            status,
            url: None,
            headers: Vec::new(),
        }
    }

    /// Set the final URL
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Append a raw header value
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl From<HttpHead> for ResponseHead {
    fn from(head: HttpHead) -> Self {
        ResponseHead::Http(head)
    }
}

/// How the body of a response should be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    #[default]
    Buffered,
    Streamed,
}

/// A response body in the mode the caller asked for
pub enum ResponseBody {
    Buffered(Bytes),
    Streamed(ResponseBytes),
}

impl ResponseBody {
    /// The mode this body was delivered in
    pub fn mode(&self) -> BodyMode {
        match self {
            ResponseBody::Buffered(_) => BodyMode::Buffered,
            ResponseBody::Streamed(_) => BodyMode::Streamed,
        }
    }

    /// The buffered body, if this is one
    pub fn into_buffered(self) -> Option<Bytes> {
        match self {
            ResponseBody::Buffered(bytes) => Some(bytes),
            ResponseBody::Streamed(_) => None,
        }
    }

    /// The byte stream, if this is one
    pub fn into_streamed(self) -> Option<ResponseBytes> {
        match self {
            ResponseBody::Buffered(_) => None,
            ResponseBody::Streamed(stream) => Some(stream),
        }
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            ResponseBody::Streamed(_) => f.write_str("Streamed"),
        }
    }
}
