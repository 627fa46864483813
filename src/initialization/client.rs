//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::BatchConfig;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for geocoding requests.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Per-request timeout from the configuration
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &BatchConfig) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}
