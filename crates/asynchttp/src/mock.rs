//! Scriptable in-memory transport for tests

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    task::{Context, Poll},
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use url::Url;

use crate::{
    chunk::ChunkSource,
    error::BoxError,
    request::Request,
    response::{HttpHead, ResponseHead},
    transport::{Transport, TransportBody},
};

type ErrorFactory = Arc<dyn Fn() -> BoxError + Send + Sync>;

#[derive(Clone)]
enum Step {
    Chunk(Bytes),
    Fail(ErrorFactory),
}

/// What the mock answers for a request
#[derive(Clone)]
pub struct MockReply {
    head: ResponseHead,
    steps: Vec<Step>,
    failure: Option<ErrorFactory>,
    complete_body: bool,
    yield_between_chunks: bool,
}

impl MockReply {
    /// An HTTP reply with `status` and no body
    pub fn status(status: u16) -> Self {
        Self {
            head: HttpHead::new(status).into(),
            steps: Vec::new(),
            failure: None,
            complete_body: false,
            yield_between_chunks: false,
        }
    }

    /// A reply that fails before any response exists
    pub fn failure<E, F>(make_error: F) -> Self
    where
        E: Into<BoxError>,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self {
            failure: Some(Arc::new(move || make_error().into())),
            ..Self::status(0)
        }
    }

    /// A reply whose head is not an HTTP response
    pub fn non_http(kind: impl Into<String>) -> Self {
        Self {
            head: ResponseHead::Other {
                kind: kind.into(),
                url: None,
            },
            ..Self::status(0)
        }
    }

    /// Add a response header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let ResponseHead::Http(head) = &mut self.head {
            head.headers.push((name.into(), value.into().into_bytes()));
        }
        self
    }

    /// Set the response URL
    pub fn url(mut self, url: Url) -> Self {
        match &mut self.head {
            ResponseHead::Http(head) => head.url = Some(url),
            ResponseHead::Other { url: slot, .. } => *slot = Some(url),
        }
        self
    }

    /// Deliver `body` as one chunk
    pub fn body(self, body: impl Into<Bytes>) -> Self {
        self.chunk(body)
    }

    /// Append a chunk to the body
    pub fn chunk(mut self, chunk: impl Into<Bytes>) -> Self {
        self.steps.push(Step::Chunk(chunk.into()));
        self
    }

    /// Append several chunks to the body
    pub fn chunks<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        self.steps
            .extend(chunks.into_iter().map(|chunk| Step::Chunk(chunk.into())));
        self
    }

    /// Fail the body stream at this point
    pub fn fail_stream<E, F>(mut self, make_error: F) -> Self
    where
        E: Into<BoxError>,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.steps
            .push(Step::Fail(Arc::new(move || make_error().into())));
        self
    }

    /// Hand buffered requests the whole body at once instead of a chunk source
    pub fn complete_body(mut self) -> Self {
        self.complete_body = true;
        self
    }

    /// Return `Pending` once before every chunk so concurrent streams interleave
    pub fn yield_between_chunks(mut self) -> Self {
        self.yield_between_chunks = true;
        self
    }
}

#[derive(Default)]
struct Shared {
    requests: Mutex<Vec<Request>>,
    closes: AtomicUsize,
    delivered: AtomicUsize,
    shut_down: AtomicBool,
}

/// Transport that answers from a routing table
///
/// Requests are matched by exact URL; unmatched requests get the fallback reply,
/// which defaults to an empty 404.
#[derive(Clone)]
pub struct MockTransport {
    routes: Vec<(String, MockReply)>,
    fallback: MockReply,
    shared: Arc<Shared>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            fallback: MockReply::status(404),
            shared: Arc::default(),
        }
    }
}

impl MockTransport {
    /// Create a transport that answers 404 to everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `reply`
    pub fn replying(reply: MockReply) -> Self {
        Self::new().fallback(reply)
    }

    /// Answer requests for `url` with `reply`
    pub fn route(mut self, url: impl Into<String>, reply: MockReply) -> Self {
        self.routes.push((url.into(), reply));
        self
    }

    /// Set the reply for unrouted requests
    pub fn fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Every request that reached `execute` or `execute_streaming`
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.shared.requests).clone()
    }

    /// How many chunk sources have been released
    pub fn closes(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// How many body chunks have been handed to a consumer
    pub fn delivered_chunks(&self) -> usize {
        self.shared.delivered.load(Ordering::SeqCst)
    }

    /// True once `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.load(Ordering::SeqCst)
    }

    fn respond(&self, request: Request) -> Result<(ResponseHead, MockReply), BoxError> {
        let reply = self
            .routes
            .iter()
            .find(|(url, _)| *url == request.url.as_str())
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.fallback.clone());
        lock(&self.shared.requests).push(request);

        if let Some(make_error) = &reply.failure {
            return Err(make_error());
        }
        Ok((reply.head.clone(), reply))
    }

    fn source(&self, reply: &MockReply) -> ChunkSource {
        let shared = self.shared.clone();
        let yielding = reply.yield_between_chunks;
        let steps = reply.steps.clone().into_iter().map(move |step| {
            let shared = shared.clone();
            async move {
                if yielding {
                    YieldOnce::default().await;
                }
                match step {
                    Step::Chunk(chunk) => {
                        shared.delivered.fetch_add(1, Ordering::SeqCst);
                        Ok(chunk)
                    }
                    Step::Fail(make_error) => Err(make_error()),
                }
            }
        });

        let shared = self.shared.clone();
        ChunkSource::new(stream::iter(steps).then(|step| step)).on_close(move || {
            shared.closes.fetch_add(1, Ordering::SeqCst);
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Native = Request;

    fn prepare(&self, request: &Request) -> Result<Request, BoxError> {
        Ok(request.clone())
    }

    async fn execute(&self, request: Request) -> Result<(ResponseHead, TransportBody), BoxError> {
        let (head, reply) = self.respond(request)?;
        if reply.complete_body {
            let mut body = Vec::new();
            for step in &reply.steps {
                match step {
                    Step::Chunk(chunk) => body.extend_from_slice(chunk),
                    Step::Fail(make_error) => return Err(make_error()),
                }
            }
            return Ok((head, TransportBody::Complete(body.into())));
        }
        Ok((head, self.source(&reply).into()))
    }

    async fn execute_streaming(
        &self,
        request: Request,
    ) -> Result<(ResponseHead, ChunkSource), BoxError> {
        let (head, reply) = self.respond(request)?;
        Ok((head, self.source(&reply)))
    }

    async fn shutdown(&self) -> Result<(), BoxError> {
        self.shared.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("routes", &self.routes.len())
            .field("closes", &self.closes())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
