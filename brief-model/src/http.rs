//! Helpers shared by the HTTP-backed clients.

use crate::retry::is_retryable_status_code;
use brief_core::{BriefError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BriefError::Model(format!("Failed to create {provider} HTTP client: {e}")))
}

/// Turns a non-success status into a `BriefError::Model` that the retry
/// classifier can read.
pub(crate) async fn check_status(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    let retryability =
        if is_retryable_status_code(status.as_u16()) { "retryable" } else { "non-retryable" };
    Err(BriefError::Model(format!("{provider} API error ({status}, {retryability}): {error_text}")))
}
