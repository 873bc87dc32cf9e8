//! `resend request` / `resend get` – send one request through the retrying client.

use anyhow::{bail, Context, Result};
use resend_core::client::{AsyncRetryClient, RetryClient};
use resend_core::config::ResendConfig;
use resend_core::http::{BufferedResponse, Headers, Request};

/// Build the request from command-line pieces.
pub(crate) fn build_request(
    method: &str,
    url: &str,
    headers: &[String],
    data: Option<String>,
) -> Result<Request> {
    let mut request = Request::new(method, url)?;
    for raw in headers {
        let Some((name, value)) = Headers::parse_pair(raw) else {
            bail!("invalid header {raw:?}, expected \"Name: value\"");
        };
        request = request.header(name, value);
    }
    if let Some(body) = data {
        request = request.body(body);
    }
    Ok(request)
}

pub async fn run_request(
    cfg: &ResendConfig,
    method: &str,
    url: &str,
    headers: &[String],
    data: Option<String>,
    use_async: bool,
) -> Result<()> {
    let request = build_request(method, url, headers, data)?;
    tracing::info!(method = request.method(), url = %request.url(), "sending");

    let response = if use_async {
        let client = AsyncRetryClient::from_config(cfg)?;
        let result = client.send(&request).await;
        client.close().await;
        result?
    } else {
        // libcurl blocks; keep it off the runtime's worker threads.
        let client = RetryClient::from_config(cfg)?;
        tokio::task::spawn_blocking(move || {
            let result = client.send(&request);
            client.close();
            result
        })
        .await
        .context("request task failed")??
    };

    print_response(&response);
    Ok(())
}

fn print_response(response: &BufferedResponse) {
    eprintln!("HTTP {}", response.status);
    for (name, value) in response.headers.iter() {
        eprintln!("{name}: {value}");
    }
    print!("{}", response.text());
}
