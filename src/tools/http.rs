use super::traits::ToolFailure;
use reqwest::{Client, StatusCode};
use serde_json::Value;

pub(crate) const USER_AGENT: &str = concat!("stepgraph/", env!("CARGO_PKG_VERSION"));

/// Shared client for HTTP-backed tools. Per-attempt timeouts are enforced by
/// the registry, so the client itself carries none.
pub(crate) fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GET a JSON document, classifying failures for the retry policy:
/// connect errors, timeouts, 5xx, 429 and 408 are transient; other non-2xx
/// statuses and malformed bodies are fatal.
pub(crate) async fn get_json(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
) -> Result<Value, ToolFailure> {
    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|err| classify_request_error(url, &err))?;

    let status = response.status();
    if !status.is_success() {
        let message = format!("GET {url} returned {status}");
        return Err(if is_transient_status(status) {
            ToolFailure::transient(message)
        } else {
            ToolFailure::fatal(message)
        });
    }

    response
        .json()
        .await
        .map_err(|err| ToolFailure::fatal(format!("invalid JSON from {url}: {err}")))
}

fn classify_request_error(url: &str, err: &reqwest::Error) -> ToolFailure {
    let message = format!("GET {url} failed: {err}");
    if err.is_timeout() || err.is_connect() || err.is_request() && err.status().is_none() {
        ToolFailure::transient(message)
    } else {
        ToolFailure::fatal(message)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

/// Pull a required string field out of a resolved tool input.
pub(crate) fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolFailure> {
    input
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolFailure::fatal(format!("missing required input field: {field}")))
}
