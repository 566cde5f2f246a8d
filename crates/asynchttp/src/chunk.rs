//! Chunked body supply from a transport

use std::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{stream::BoxStream, Stream, StreamExt};
use tracing::trace;

use crate::error::BoxError;

type CloseHook = Box<dyn FnOnce() + Send>;

/// A transport's body, delivered as a sequence of byte chunks
///
/// The source owns the underlying connection. It is released exactly once: when
/// the stream ends, when it yields an error, on [`ChunkSource::close`], or when
/// the source is dropped before any of those. After release every poll returns
/// `None`.
pub struct ChunkSource {
    inner: Option<BoxStream<'static, Result<Bytes, BoxError>>>,
    on_close: Option<CloseHook>,
}

impl ChunkSource {
    /// Wrap a transport body stream
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
    {
        Self {
            inner: Some(stream.boxed()),
            on_close: None,
        }
    }

    /// A source that yields the given chunks and then ends
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        let chunks: Vec<Result<Bytes, BoxError>> =
            chunks.into_iter().map(|chunk| Ok(chunk.into())).collect();
        Self::new(futures::stream::iter(chunks))
    }

    /// A source with no chunks at all
    pub fn empty() -> Self {
        Self::new(futures::stream::empty())
    }

    /// Run `hook` when the source is released
    ///
    /// Hooks compose: the earlier hook runs first.
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(match self.on_close.take() {
            Some(previous) => Box::new(move || {
                previous();
                hook();
            }),
            None => Box::new(hook),
        });
        self
    }

    /// Release the connection now; later polls return `None`
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            trace!("Closing chunk source");
        }
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }

    /// True once the connection has been released
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl Stream for ChunkSource {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                trace!(len = chunk.len(), "Received chunk");
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => {
                self.close();
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                self.close();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ChunkSource {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ChunkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkSource")
            .field("closed", &self.is_closed())
            .finish()
    }
}
