use reqwest::Client as HttpClient;
use std::time::Duration;

use crate::error::AppResult;

/// Connect timeout is capped so a dead host fails fast even with a long
/// overall request timeout
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates the HTTP connection pool shared by the generation and catalog clients
///
/// `reqwest::Client` is a handle onto one pool; clones share connections.
pub fn create_http_client(timeout: Duration) -> AppResult<HttpClient> {
    let client = HttpClient::builder()
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .timeout(timeout)
        .build()?;

    tracing::debug!(timeout_secs = timeout.as_secs(), "HTTP client pool created");

    Ok(client)
}
