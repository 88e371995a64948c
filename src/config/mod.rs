//! Configuration types for the Mercado Bitcoin clients.
//!
//! These types are designed to be deserialized from TOML configuration
//! files. Credentials are never stored in the config itself: the config
//! names the environment variables they are resolved from, once, at
//! client construction. The resulting settings are immutable for the
//! process lifetime and injected into every client instance.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "https://www.mercadobitcoin.net".to_string()
}

/// Top-level configuration for the Mercado Bitcoin APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MercadoBitcoinConfig {
    /// Base URL shared by the trade API and the public data API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// REST transport configuration
    #[serde(default)]
    pub rest: RestConfig,
    /// Credential configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for MercadoBitcoinConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            rest: RestConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl MercadoBitcoinConfig {
    /// Production configuration with default credential env vars.
    pub fn production() -> Self {
        Self::default()
    }

    /// Override the base URL (useful for tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// REST transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum retries for transient failures (public download loop only;
    /// the trade API client never retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RestConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the retry delay as a Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Credential configuration.
///
/// The TAPI identifier and secret are loaded from environment variables
/// for security; only the variable names live in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name for the TAPI identifier
    #[serde(default = "default_tapi_id_env")]
    pub tapi_id_env: String,
    /// Environment variable name for the TAPI secret
    #[serde(default = "default_tapi_secret_env")]
    pub tapi_secret_env: String,
}

fn default_tapi_id_env() -> String {
    "MB_TAPI_ID".to_string()
}

fn default_tapi_secret_env() -> String {
    "MB_TAPI_SECRET".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tapi_id_env: default_tapi_id_env(),
            tapi_secret_env: default_tapi_secret_env(),
        }
    }
}

impl AuthConfig {
    /// Create an auth config with explicit environment variable names.
    pub fn new(tapi_id_env: impl Into<String>, tapi_secret_env: impl Into<String>) -> Self {
        Self {
            tapi_id_env: tapi_id_env.into(),
            tapi_secret_env: tapi_secret_env.into(),
        }
    }

    /// Load the TAPI identifier from the environment.
    pub fn load_tapi_id(&self) -> Option<String> {
        std::env::var(&self.tapi_id_env).ok()
    }

    /// Load the TAPI secret from the environment.
    pub fn load_tapi_secret(&self) -> Option<String> {
        std::env::var(&self.tapi_secret_env).ok()
    }

    /// Returns true if both credentials are available in the environment.
    pub fn has_credentials(&self) -> bool {
        self.load_tapi_id().is_some() && self.load_tapi_secret().is_some()
    }
}
