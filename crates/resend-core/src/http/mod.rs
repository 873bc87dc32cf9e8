//! Minimal HTTP request/response model consumed by the retrying transports.
//!
//! The retry engine only needs a method on the request and a status code,
//! header lookup and an explicit close on the response; everything else is
//! the underlying transport's business.

mod headers;

pub use headers::Headers;

use url::Url;

use crate::retry::{ErrorKind, TransportError};

/// An HTTP request that can be sent any number of times.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    url: Url,
    headers: Headers,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Creates a request; the method token is upper-cased.
    pub fn new(method: &str, url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| {
            TransportError::with_source(ErrorKind::LocalProtocol, format!("invalid URL {url:?}"), e)
        })?;
        Ok(Self {
            method: method.trim().to_ascii_uppercase(),
            url,
            headers: Headers::new(),
            body: None,
        })
    }

    pub fn get(url: &str) -> Result<Self, TransportError> {
        Self::new("GET", url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// What the retry engine needs from a response.
///
/// `close` consumes the response, so a response can be released at most once.
pub trait Response {
    fn status(&self) -> u16;

    fn header(&self, name: &str) -> Option<&str>;

    /// Release any resources held by the response (connection, body buffer).
    fn close(self);
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Response for BufferedResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    fn close(self) {}
}
