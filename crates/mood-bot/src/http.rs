//! HTTP plumbing shared by every provider adapter.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::ProviderError;

/// Build the client shared by all providers. Each request is still an
/// independent round trip; only the connection pool is shared.
pub fn build_client(config: &HttpConfig) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(config.user_agent.clone())
        .build()
}

/// Send `request` and decode a JSON body of type `T`.
///
/// Non-2xx statuses, HTML error pages and malformed JSON all become
/// [`ProviderError`]s carrying a short body preview for the logs.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    endpoint: &str,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::request(endpoint, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::request(endpoint, e))?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: preview(&body, 300),
        });
    }

    decode_json(&body, endpoint)
}

/// Decode a JSON body, detecting HTML pages that CDNs and proxies sometimes
/// return with a 200.
pub fn decode_json<T: DeserializeOwned>(body: &str, endpoint: &str) -> Result<T, ProviderError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return Err(ProviderError::Decode {
            endpoint: endpoint.to_string(),
            message: format!("got HTML instead of JSON: {}", preview(trimmed, 200)),
        });
    }

    serde_json::from_str::<T>(body).map_err(|e| ProviderError::Decode {
        endpoint: endpoint.to_string(),
        message: format!("{}; body: {}", e, preview(body, 300)),
    })
}

/// First `max_chars` characters of `text`, char-boundary safe.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}
