//! Boundary to the protocol engine that carries requests to the backend.

use std::fmt;

use crate::error::RemoteError;
use crate::protocol::WireRequest;

/// Raw response buffer delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    body: Vec<u8>,
}

impl RawResponse {
    /// Wraps a response body.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }

    /// Response body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }
}

/// Callback through which the transport delivers the outcome of a request.
pub type ReplySink = Box<dyn FnOnce(Result<RawResponse, RemoteError>) + Send>;

/// Sends requests and reports their outcome asynchronously.
///
/// Implementations must invoke `reply` exactly once, after `send` has
/// returned or from within it, on the thread that drives the client.
///
/// # Example
///
/// ```
/// use affiliate_client::{RemoteError, ReplySink, Transport, WireRequest};
///
/// struct Offline;
///
/// impl Transport for Offline {
///     fn send(&self, _request: WireRequest, reply: ReplySink) {
///         reply(Err(RemoteError::new(-1, "offline")));
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Sends one request.
    fn send(&self, request: WireRequest, reply: ReplySink);
}

impl fmt::Debug for dyn Transport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Transport")
    }
}
