//! Connection settings for the CKAN portal

use std::time::Duration;

use crate::vocab::PORTAL_BASE_URL;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// CKAN instance the API calls go to
    pub ckan_url: String,
    /// Sent verbatim as the `Authorization` header when present
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ckan_url: PORTAL_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
