//! Transports: the underlying "send a request, get a response or fail"
//! contract, the retrying wrappers around it, and a curl-backed
//! implementation.

mod async_retrying;
mod libcurl;
mod retrying;
mod shutdown;

pub use async_retrying::AsyncRetryTransport;
pub use libcurl::{AsyncCurlTransport, CurlOptions, CurlTransport};
pub use retrying::RetryTransport;

use async_trait::async_trait;

use crate::http::{Request, Response};
use crate::retry::TransportError;

/// A blocking transport.
///
/// Implementations must tolerate being called repeatedly with the same
/// request and from several threads at once.
pub trait Transport: Send + Sync {
    type Response: Response;

    fn send(&self, request: &Request) -> Result<Self::Response, TransportError>;

    /// Release the transport's resources. Must be idempotent.
    fn close(&self) {}
}

/// An async transport.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    type Response: Response + Send;

    async fn send(&self, request: &Request) -> Result<Self::Response, TransportError>;

    /// Release the transport's resources. Must be idempotent.
    async fn close(&self) {}
}
