//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

/// Initializes the HTTP client used to load live pages.
///
/// Creates a `reqwest::Client` configured with:
/// - The given User-Agent header
/// - The given request timeout
/// - Redirect following enabled (reqwest's default of up to 10 hops)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(timeout: Duration, user_agent: &str) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(Arc::new(client))
}
