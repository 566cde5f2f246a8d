//! Turns transport output into envelopes and bodies

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{trace, warn};

use crate::{
    byte_stream::{ByteStream, ResponseBytes},
    chunk::ChunkSource,
    error::{Error, Result},
    request::Request,
    response::{Headers, Response, ResponseHead},
    transport::TransportBody,
};

/// Build the envelope for `head`
///
/// Repeated header names collapse to their last value. Header values that are not
/// valid UTF-8 are decoded lossily.
pub fn envelope(head: &ResponseHead, request: &Request) -> Result<Response> {
    let http = match head {
        ResponseHead::Http(http) => http,
        ResponseHead::Other { kind, url } => {
            let received = match url {
                Some(url) => format!("{kind} response for {url}"),
                None => format!("{kind} response"),
            };
            return Err(Error::invalid_response(request, received));
        }
    };

    if !(100..=999).contains(&http.status) {
        return Err(Error::invalid_response(
            request,
            format!("status code {}", http.status),
        ));
    }

    let headers: Headers = http
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), String::from_utf8_lossy(value).into_owned()))
        .collect();

    Ok(Response {
        status_code: http.status,
        url: http.url.clone(),
        headers,
    })
}

/// Read a whole body into memory, failing once it exceeds `limit` bytes
///
/// Nothing is returned on failure; the chunk source is closed on every path.
pub async fn drain(body: TransportBody, limit: usize, request: &Request) -> Result<Bytes> {
    let mut source = match body {
        TransportBody::Complete(bytes) if bytes.len() > limit => {
            warn!(limit, len = bytes.len(), "Buffered body exceeds limit: {}", request);
            return Err(Error::body_too_large(request, limit));
        }
        TransportBody::Complete(bytes) => return Ok(bytes),
        TransportBody::Chunked(source) => source,
    };

    let mut buffer = BytesMut::new();
    while let Some(chunk) = source.next().await {
        let chunk = chunk.map_err(|e| Error::network(request, e))?;
        if buffer.len() + chunk.len() > limit {
            source.close();
            warn!(limit, "Buffered body exceeds limit: {}", request);
            return Err(Error::body_too_large(request, limit));
        }
        buffer.extend_from_slice(&chunk);
    }

    trace!(len = buffer.len(), "Drained body");
    Ok(buffer.freeze())
}

/// Wait for the first chunk of a streamed body and wrap the source
///
/// A source that ends before producing any chunk is `ResponseStreamEmpty` unless
/// `allow_empty` is set. An empty first chunk still counts as data.
pub async fn open_stream(
    mut source: ChunkSource,
    allow_empty: bool,
    request: &Request,
) -> Result<ResponseBytes> {
    match source.next().await {
        Some(Ok(first)) => Ok(ByteStream::with_first_chunk(source, first)),
        Some(Err(e)) => Err(Error::network(request, e)),
        None if allow_empty => Ok(ByteStream::new(source)),
        None => Err(Error::stream_empty(request)),
    }
}
