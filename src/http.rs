//! Shared HTTP client construction for the service clients.

use crate::error::PipelineError;
use reqwest::{Client, Response};
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client with a connect timeout and, when given, a whole-request timeout.
pub(crate) fn build_http_client(request_timeout: Option<Duration>) -> Result<Client, PipelineError> {
    let builder = Client::builder().connect_timeout(HTTP_CONNECT_TIMEOUT);
    let builder = match request_timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder
        .build()
        .map_err(|e| PipelineError::HttpClient(format!("Failed to create HTTP client: {}", e)))
}

/// Strip a trailing slash so endpoint paths can be appended with `/`.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Read a response body for an error message; never fails.
pub(crate) async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}
