//! Transport double that parks requests until a test answers them.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::RemoteError;
use crate::protocol::WireRequest;
use crate::transport::{RawResponse, ReplySink, Transport};

struct Pending {
    request: WireRequest,
    reply: Option<ReplySink>,
}

/// Records every request and lets the test deliver replies in any order.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    shared: Arc<Mutex<Vec<Pending>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests sent so far, in send order.
    pub fn requests(&self) -> Vec<WireRequest> {
        self.lock()
            .iter()
            .map(|pending| pending.request.clone())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.lock().len()
    }

    /// The only request sent so far.
    pub fn single_request(&self) -> WireRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected one request, got {requests:?}");
        requests.into_iter().next().expect("one request")
    }

    /// Answers request `index` with a JSON payload.
    pub fn reply(&self, index: usize, payload: &Value) {
        let body = serde_json::to_vec(payload).expect("serialise payload");
        self.deliver(index, Ok(RawResponse::new(body)));
    }

    /// Answers request `index` with raw bytes.
    pub fn reply_raw(&self, index: usize, body: &[u8]) {
        self.deliver(index, Ok(RawResponse::new(body)));
    }

    /// Fails request `index` at the transport level.
    pub fn fail(&self, index: usize, error: RemoteError) {
        self.deliver(index, Err(error));
    }

    fn deliver(&self, index: usize, outcome: Result<RawResponse, RemoteError>) {
        // The handler may send again, so the lock is released before replying.
        let reply = {
            let mut pending = self.lock();
            pending
                .get_mut(index)
                .unwrap_or_else(|| panic!("no request at index {index}"))
                .reply
                .take()
                .unwrap_or_else(|| panic!("request {index} was already answered"))
        };
        reply(outcome);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Pending>> {
        self.shared.lock().expect("transport lock poisoned")
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: WireRequest, reply: ReplySink) {
        self.lock().push(Pending {
            request,
            reply: Some(reply),
        });
    }
}
