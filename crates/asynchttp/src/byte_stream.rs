//! Byte-at-a-time view over a chunked body

use std::{
    fmt,
    pin::Pin,
    task::{ready, Context, Poll},
};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::{chunk::ChunkSource, lines::Lines};

/// Byte stream handed out for streamed responses
pub type ResponseBytes = ByteStream<ChunkSource>;

/// Re-slices a stream of chunks into a stream of single bytes
///
/// Empty chunks are skipped. A source error is yielded as-is and terminates the
/// stream; the source is dropped as soon as it ends or fails, so any connection it
/// holds is released without waiting for the `ByteStream` itself to be dropped.
pub struct ByteStream<S> {
    source: Option<S>,
    chunk: Bytes,
    offset: usize,
}

impl<S> ByteStream<S> {
    /// Wrap a chunk stream
    pub fn new(source: S) -> Self {
        Self {
            source: Some(source),
            chunk: Bytes::new(),
            offset: 0,
        }
    }

    /// Start from a chunk that was already pulled from `source`
    pub(crate) fn with_first_chunk(source: S, chunk: Bytes) -> Self {
        Self {
            source: Some(source),
            chunk,
            offset: 0,
        }
    }

    /// Bytes of the current chunk that have not been yielded yet
    pub fn remaining(&self) -> &[u8] {
        &self.chunk[self.offset..]
    }

    /// True once the source has ended or failed and every byte was yielded
    pub fn is_terminated(&self) -> bool {
        self.source.is_none() && self.offset == self.chunk.len()
    }

    /// Decode the bytes as UTF-8 text lines
    pub fn lines(self) -> Lines<Self> {
        Lines::new(self)
    }
}

impl<S, E> ByteStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    /// Pull the remaining bytes of the current chunk, or the next non-empty chunk
    ///
    /// Lets callers that do not need byte granularity skip the per-byte overhead.
    /// Returns `None` at end of stream.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, E>> {
        if self.offset < self.chunk.len() {
            let rest = self.chunk.slice(self.offset..);
            self.offset = self.chunk.len();
            return Some(Ok(rest));
        }

        loop {
            let source = self.source.as_mut()?;
            match source.next().await {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => return Some(Ok(chunk)),
                Some(Err(error)) => {
                    self.source = None;
                    return Some(Err(error));
                }
                None => {
                    self.source = None;
                    return None;
                }
            }
        }
    }
}

impl<S, E> Stream for ByteStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<u8, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(&byte) = this.chunk.get(this.offset) {
                this.offset += 1;
                return Poll::Ready(Some(Ok(byte)));
            }

            let Some(source) = this.source.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(source.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    // empty chunks fall through to the next pull
                    this.chunk = chunk;
                    this.offset = 0;
                }
                Some(Err(error)) => {
                    this.source = None;
                    return Poll::Ready(Some(Err(error)));
                }
                None => {
                    this.source = None;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<S> fmt::Debug for ByteStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("remaining", &(self.chunk.len() - self.offset))
            .field("source_open", &self.source.is_some())
            .finish()
    }
}
