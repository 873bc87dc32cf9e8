//! Minimal HTTP/1.1 server for curl transport tests.
//!
//! Answers the first `failures` requests with a configurable status (and
//! optional Retry-After), then 200 with a fixed body. Counts requests.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FlakyOptions {
    pub failures: usize,
    pub failure_status: u16,
    pub retry_after: Option<String>,
    pub body: &'static str,
}

impl Default for FlakyOptions {
    fn default() -> Self {
        Self {
            failures: 2,
            failure_status: 503,
            retry_after: Some("0".to_string()),
            body: "hello",
        }
    }
}

pub struct FlakyServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl FlakyServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts the server on a background thread. It runs until the process exits.
pub fn start(opts: FlakyOptions) -> FlakyServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            handle(stream, n, &opts);
        }
    });
    FlakyServer {
        url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, n: usize, opts: &FlakyOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    if !matches!(stream.read(&mut buf), Ok(n) if n > 0) {
        return;
    }
    let response = if n < opts.failures {
        let retry_after = opts
            .retry_after
            .as_deref()
            .map(|v| format!("Retry-After: {}\r\n", v))
            .unwrap_or_default();
        format!(
            "HTTP/1.1 {} Unavailable\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
            opts.failure_status, retry_after
        )
    } else {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            opts.body.len(),
            opts.body
        )
    };
    let _ = stream.write_all(response.as_bytes());
}

/// A local port with nothing listening (connection refused).
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}
