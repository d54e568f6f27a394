use crate::error::{Error, Result};
use crate::http::DEFAULT_USER_AGENT;
use std::env;

/// Runtime configuration for the Okta client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    pub api_token: String,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - OKTA_API_TOKEN [required]
    /// - OKTA_BASE_URL [required, trailing slash, e.g. https://acme.okta.com/api/v1/]
    /// - OKTA_HTTP_TIMEOUT_SECS (default: 30)
    /// - OKTA_USER_AGENT (default: okta-client/<version>)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_token = get("OKTA_API_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::validation("Missing OKTA_API_TOKEN"))?;
        let base_url = get("OKTA_BASE_URL")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::validation("Missing OKTA_BASE_URL"))?;
        let timeout_secs = get("OKTA_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let user_agent = get("OKTA_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            api_token,
            base_url,
            user_agent,
            timeout_secs,
        })
    }
}
