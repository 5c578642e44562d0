//! In-memory [`HttpTransport`] for tests and offline wiring.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::SmsError;

/// Replays scripted responses and records every request it sees.
///
/// Responses are served in the order they were queued; once the queue is
/// drained the last one is repeated. With nothing queued every call fails
/// with a transport error. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    queued: VecDeque<Result<HttpResponse, SmsError>>,
    last: Option<Result<HttpResponse, SmsError>>,
    requests: Vec<HttpRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that always answers `status` with `body`.
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push_response(status, body);
        mock
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.push(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    pub fn push_error(&self, err: SmsError) {
        self.push(Err(err));
    }

    fn push(&self, item: Result<HttpResponse, SmsError>) {
        self.lock().queued.push_back(item);
    }

    /// Number of requests executed so far.
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // a panicking test thread must not hide the recorded requests
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, SmsError> {
        let mut state = self.lock();
        state.requests.push(request);
        if let Some(next) = state.queued.pop_front() {
            state.last = Some(next.clone());
            return next;
        }
        state
            .last
            .clone()
            .unwrap_or_else(|| Err(SmsError::Transport("no scripted response".into())))
    }
}
