use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{DownstreamError, DownstreamResponse, Transport};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond { status: u16, body: Value },
    /// Network-level failure (refused, DNS, reset).
    Fail(String),
    TimeOut,
}

impl Scripted {
    pub fn ok(body: Value) -> Self {
        Scripted::Respond { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Scripted::Respond {
            status,
            body: Value::Object(Default::default()),
        }
    }
}

/// What the mock was asked to send.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub body: Value,
    pub timeout: Duration,
}

/// A scripted transport for tests. Returns pre-defined outcomes in order
/// and records every call.
pub struct MockTransport {
    replies: Vec<Scripted>,
    index: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new(replies: Vec<Scripted>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<DownstreamResponse, DownstreamError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(RecordedCall {
            url: url.to_string(),
            body: body.clone(),
            timeout,
        });

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(i) {
            Some(Scripted::Respond { status, body }) => Ok(DownstreamResponse {
                status: *status,
                body: body.to_string(),
            }),
            Some(Scripted::Fail(message)) => Err(DownstreamError::Transport {
                url: url.to_string(),
                source: message.clone().into(),
            }),
            Some(Scripted::TimeOut) => Err(DownstreamError::Timeout {
                url: url.to_string(),
                after: timeout,
            }),
            None => Err(DownstreamError::Transport {
                url: url.to_string(),
                source: format!("MockTransport: no more replies (called {} times)", i + 1).into(),
            }),
        }
    }
}
