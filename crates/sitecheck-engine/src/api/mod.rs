//! Checks that talk HTTP directly, without a browser.

pub mod registration;
pub mod spotify;

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shared HTTP client for the API suites.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sitecheck/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Fail with [`ApiError::Status`] unless the response is 200.
pub(crate) async fn ensure_ok(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::OK {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        url,
        status: status.as_u16(),
        body,
    })
}
