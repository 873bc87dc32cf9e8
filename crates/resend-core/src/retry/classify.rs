//! Classify curl errors into retry error kinds.

use super::error::{ErrorKind, TransportError};

/// Classify a curl error.
///
/// curl reports connect and transfer timeouts with the same code, so the
/// caller says whether a connection had been established.
pub fn classify_curl_error(e: &curl::Error, connected: bool) -> ErrorKind {
    if e.is_operation_timedout() {
        return if connected {
            ErrorKind::ReadTimeout
        } else {
            ErrorKind::ConnectTimeout
        };
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_ssl_connect_error()
    {
        return ErrorKind::Connect;
    }
    if e.is_recv_error() || e.is_read_error() || e.is_partial_file() {
        return ErrorKind::Read;
    }
    if e.is_send_error() || e.is_write_error() {
        return ErrorKind::Write;
    }
    if e.is_got_nothing() || e.is_http2_error() || e.is_http2_stream_error() {
        return ErrorKind::RemoteProtocol;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() || e.is_bad_content_encoding() {
        return ErrorKind::LocalProtocol;
    }
    if e.is_aborted_by_callback() {
        return ErrorKind::Cancelled;
    }
    ErrorKind::Transport
}

/// Wrap a curl error as a [`TransportError`] with its classification.
pub fn from_curl_error(e: curl::Error, connected: bool) -> TransportError {
    let kind = classify_curl_error(&e, connected);
    let message = e.description().to_string();
    TransportError::with_source(kind, message, e)
}
