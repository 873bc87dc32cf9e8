//! Tests for request, get and config parsing.

use super::parse;
use crate::cli::commands::build_request;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_request_defaults() {
    match parse(&["resend", "request", "https://example.com/"]) {
        CliCommand::Request {
            url,
            method,
            headers,
            data,
            retry,
        } => {
            assert_eq!(url, "https://example.com/");
            assert_eq!(method, "GET");
            assert!(headers.is_empty());
            assert!(data.is_none());
            assert!(retry.total.is_none());
            assert!(!retry.use_async);
        }
        _ => panic!("expected Request"),
    }
}

#[test]
fn cli_parse_request_with_method_headers_and_body() {
    match parse(&[
        "resend",
        "request",
        "-X",
        "POST",
        "-H",
        "Accept: text/plain",
        "-H",
        "X-Trace: 1",
        "-d",
        "payload",
        "https://example.com/upload",
    ]) {
        CliCommand::Request {
            method,
            headers,
            data,
            ..
        } => {
            assert_eq!(method, "POST");
            assert_eq!(headers, vec!["Accept: text/plain", "X-Trace: 1"]);
            assert_eq!(data.as_deref(), Some("payload"));
        }
        _ => panic!("expected Request"),
    }
}

#[test]
fn cli_parse_get() {
    match parse(&["resend", "get", "https://example.com/", "--async"]) {
        CliCommand::Get { url, retry } => {
            assert_eq!(url, "https://example.com/");
            assert!(retry.use_async);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_config_with_global_flags() {
    let cli = Cli::try_parse_from(["resend", "-vv", "config", "--config", "/tmp/r.toml"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/r.toml")));
    assert!(matches!(cli.command, CliCommand::Config));
}

#[test]
fn cli_requires_url() {
    assert!(Cli::try_parse_from(["resend", "get"]).is_err());
}

#[test]
fn build_request_applies_headers_and_body() {
    let req = build_request(
        "put",
        "https://example.com/x",
        &["Content-Type: text/plain".to_string()],
        Some("hi".to_string()),
    )
    .unwrap();
    assert_eq!(req.method(), "PUT");
    assert_eq!(req.headers().get("content-type"), Some("text/plain"));
    assert_eq!(req.body_bytes(), Some(&b"hi"[..]));
}

#[test]
fn build_request_rejects_malformed_header() {
    let err = build_request("GET", "https://example.com/", &["nocolon".to_string()], None).unwrap_err();
    assert!(err.to_string().contains("invalid header"));
}
