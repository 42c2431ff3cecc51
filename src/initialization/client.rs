//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::BROWSER_USER_AGENT;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used by the passive harvesters.
///
/// The client carries the job's per-query timeout as a client-level deadline
/// and a browser-shaped User-Agent, since the passive DNS source rejects
/// default library agents.
///
/// # Errors
///
/// Returns an error if client construction fails.
pub fn init_harvester_client(timeout: Duration) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .build()?;
    Ok(client)
}
