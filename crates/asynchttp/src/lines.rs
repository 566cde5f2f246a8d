//! UTF-8 line decoding over byte streams

use std::{
    pin::Pin,
    task::{ready, Context, Poll},
};

use futures::{Stream, StreamExt};
use tracing::debug;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Incremental line splitter
///
/// Feed bytes with [`push`](Self::push); a completed line comes back whenever an LF
/// arrives. `\r\n` and `\n` both terminate a line and neither terminator is part of
/// the returned text. Lines that are not valid UTF-8 decode to an empty string.
#[derive(Debug, Default, Clone)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning the line it completes
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte != LF {
            self.buffer.push(byte);
            return None;
        }

        if self.buffer.last() == Some(&CR) {
            self.buffer.pop();
        }
        Some(self.take_line())
    }

    /// Feed a slice, appending every completed line to `lines`
    pub fn push_slice(&mut self, bytes: &[u8], lines: &mut Vec<String>) {
        lines.extend(bytes.iter().filter_map(|&byte| self.push(byte)));
    }

    /// End of input: return the unterminated tail, if any
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    /// Drop any partially accumulated line
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Bytes of the current, unterminated line
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn take_line(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buffer);
        String::from_utf8(bytes).unwrap_or_else(|error| {
            debug!(
                len = error.as_bytes().len(),
                "Discarding line with invalid UTF-8"
            );
            String::new()
        })
    }
}

/// Lines decoded from a byte stream
///
/// An upstream error is yielded once, the partial line is discarded and the stream
/// ends. At a clean end of input an unterminated tail is yielded as the last line.
pub struct Lines<B> {
    bytes: Option<B>,
    decoder: LineDecoder,
}

impl<B> Lines<B> {
    /// Decode lines from `bytes`
    pub fn new(bytes: B) -> Self {
        Self {
            bytes: Some(bytes),
            decoder: LineDecoder::new(),
        }
    }
}

impl<B, E> Stream for Lines<B>
where
    B: Stream<Item = Result<u8, E>> + Unpin,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(bytes) = this.bytes.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(bytes.poll_next_unpin(cx)) {
                Some(Ok(byte)) => {
                    if let Some(line) = this.decoder.push(byte) {
                        return Poll::Ready(Some(Ok(line)));
                    }
                }
                Some(Err(error)) => {
                    this.bytes = None;
                    this.decoder.clear();
                    return Poll::Ready(Some(Err(error)));
                }
                None => {
                    this.bytes = None;
                    return Poll::Ready(this.decoder.finish().map(Ok));
                }
            }
        }
    }
}

/// Line decoding for any fallible byte stream
pub trait ByteSequenceExt<E>: Stream<Item = Result<u8, E>> + Sized {
    /// Decode the stream as UTF-8 lines
    fn lines(self) -> Lines<Self> {
        Lines::new(self)
    }
}

impl<S, E> ByteSequenceExt<E> for S where S: Stream<Item = Result<u8, E>> {}
