//! Request and response interception

use bytes::Bytes;

use crate::{
    byte_stream::ResponseBytes,
    error::BoxError,
    request::Request,
    response::{Response, ResponseHead},
};

/// Hook for rewriting native requests and final results
///
/// `N` is the transport's native request type. Every method defaults to passing its
/// input through unchanged.
pub trait Interceptor<N>: Send + Sync {
    /// Rewrite the native request built for `request`
    fn intercept_request(&self, request: &Request, native: N) -> Result<N, BoxError> {
        let _ = request;
        Ok(native)
    }

    /// Rewrite a buffered result
    fn intercept_data(
        &self,
        head: &ResponseHead,
        data: Bytes,
        response: Response,
    ) -> Result<(Bytes, Response), BoxError> {
        let _ = head;
        Ok((data, response))
    }

    /// Rewrite a streamed result
    fn intercept_stream(
        &self,
        head: &ResponseHead,
        stream: ResponseBytes,
        response: Response,
    ) -> Result<(ResponseBytes, Response), BoxError> {
        let _ = head;
        Ok((stream, response))
    }
}

/// Interceptor that changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<N> Interceptor<N> for PassThrough {}
