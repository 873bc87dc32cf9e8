//! Underlying transport built on libcurl (`curl::easy`).
//!
//! Each attempt uses a fresh `Easy` handle and buffers the whole body, so
//! responses hold no connection once returned.

use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use curl::easy::{Easy, List};

use super::{AsyncTransport, Transport};
use crate::http::{BufferedResponse, Headers, Request};
use crate::retry::{from_curl_error, ErrorKind, TransportError};

/// Per-request curl settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer timeout.
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
            follow_redirects: false,
        }
    }
}

/// Blocking transport that performs each request with libcurl.
#[derive(Debug, Default)]
pub struct CurlTransport {
    options: CurlOptions,
    closed: AtomicBool,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self {
            options,
            closed: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &CurlOptions {
        &self.options
    }

    fn perform(&self, request: &Request) -> Result<BufferedResponse, TransportError> {
        let setup = |e| from_curl_error(e, false);

        let mut easy = Easy::new();
        easy.url(request.url().as_str()).map_err(setup)?;
        easy.connect_timeout(self.options.connect_timeout).map_err(setup)?;
        easy.timeout(self.options.timeout).map_err(setup)?;
        easy.follow_location(self.options.follow_redirects).map_err(setup)?;

        if let Some(body) = request.body_bytes() {
            easy.post_fields_copy(body).map_err(setup)?;
        }
        match request.method() {
            "HEAD" => easy.nobody(true).map_err(setup)?,
            "GET" if request.body_bytes().is_none() => easy.get(true).map_err(setup)?,
            other => easy.custom_request(other).map_err(setup)?,
        }

        if !request.headers().is_empty() {
            let mut list = List::new();
            for (name, value) in request.headers().iter() {
                list.append(&format!("{}: {}", name, value)).map_err(setup)?;
            }
            easy.http_headers(list).map_err(setup)?;
        }

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        let result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = str::from_utf8(data) {
                        header_lines.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(setup)?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(setup)?;
            transfer.perform()
        };

        if let Err(e) = result {
            let connected = easy
                .connect_time()
                .map(|t| t > Duration::ZERO)
                .unwrap_or(false);
            return Err(from_curl_error(e, connected));
        }

        let code = easy.response_code().map_err(|e| from_curl_error(e, true))?;
        let status = u16::try_from(code).map_err(|_| {
            TransportError::new(ErrorKind::RemoteProtocol, format!("invalid status code {code}"))
        })?;

        Ok(BufferedResponse {
            status,
            headers: Headers::from_lines(&header_lines),
            body,
        })
    }
}

impl Transport for CurlTransport {
    type Response = BufferedResponse;

    fn send(&self, request: &Request) -> Result<BufferedResponse, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::closed());
        }
        tracing::trace!(method = request.method(), url = %request.url(), "curl request");
        self.perform(request)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Runs [`CurlTransport`] on tokio's blocking pool.
#[derive(Debug, Clone, Default)]
pub struct AsyncCurlTransport {
    inner: Arc<CurlTransport>,
}

impl AsyncCurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self {
            inner: Arc::new(CurlTransport::new(options)),
        }
    }
}

#[async_trait]
impl AsyncTransport for AsyncCurlTransport {
    type Response = BufferedResponse;

    async fn send(&self, request: &Request) -> Result<BufferedResponse, TransportError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        tokio::task::spawn_blocking(move || inner.send(&request))
            .await
            .map_err(|e| TransportError::with_source(ErrorKind::Cancelled, "curl worker failed", e))?
    }

    async fn close(&self) {
        self.inner.close();
    }
}
