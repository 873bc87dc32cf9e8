//! Scripted transports for driving the retry loop in tests.
//!
//! Each send pops the next step from the script (the last step repeats
//! forever) and every response carries its own close counter, so tests can
//! check that discarded responses are closed exactly once and the returned
//! response never.

#![allow(dead_code)]

use async_trait::async_trait;
use resend_core::http::{Headers, Request, Response};
use resend_core::retry::{ErrorKind, TransportError};
use resend_core::transport::{AsyncTransport, Transport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Step {
    Status(u16),
    RetryAfter(u16, String),
    Fail(ErrorKind),
}

#[derive(Debug)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Headers,
    pub seq: usize,
    closes: Arc<AtomicUsize>,
}

impl Response for MockResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    fn close(self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Inner {
    script: Mutex<VecDeque<Step>>,
    sends: AtomicUsize,
    closes: AtomicUsize,
    responses: Mutex<Vec<Arc<AtomicUsize>>>,
}

impl Inner {
    fn next(&self) -> Result<MockResponse, TransportError> {
        let seq = self.sends.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().expect("empty script")
            }
        };
        let (status, retry_after) = match step {
            Step::Status(s) => (s, None),
            Step::RetryAfter(s, v) => (s, Some(v)),
            Step::Fail(kind) => return Err(TransportError::new(kind, format!("attempt {seq} failed"))),
        };
        let mut headers = Headers::new();
        if let Some(v) = retry_after {
            headers.append("Retry-After", v);
        }
        let closes = Arc::new(AtomicUsize::new(0));
        self.responses.lock().unwrap().push(Arc::clone(&closes));
        Ok(MockResponse {
            status,
            headers,
            seq,
            closes,
        })
    }
}

/// Blocking scripted transport. Clones share state.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
    /// Optional per-send delay, to keep a call in flight.
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new(script: Vec<Step>) -> Self {
        let t = Self::default();
        *t.inner.script.lock().unwrap() = script.into();
        t
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn sends(&self) -> usize {
        self.inner.sends.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Close count of every response produced so far, in send order.
    pub fn response_closes(&self) -> Vec<usize> {
        self.inner
            .responses
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .collect()
    }
}

impl Transport for MockTransport {
    type Response = MockResponse;

    fn send(&self, _request: &Request) -> Result<MockResponse, TransportError> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        self.inner.next()
    }

    fn close(&self) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Async scripted transport sharing the same bookkeeping.
#[derive(Clone, Default)]
pub struct MockAsyncTransport(pub MockTransport);

impl MockAsyncTransport {
    pub fn new(script: Vec<Step>) -> Self {
        Self(MockTransport::new(script))
    }
}

#[async_trait]
impl AsyncTransport for MockAsyncTransport {
    type Response = MockResponse;

    async fn send(&self, _request: &Request) -> Result<MockResponse, TransportError> {
        if let Some(latency) = self.0.latency {
            tokio::time::sleep(latency).await;
        }
        self.0.inner.next()
    }

    async fn close(&self) {
        self.0.inner.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn get() -> Request {
    Request::get("https://example.com/").unwrap()
}
