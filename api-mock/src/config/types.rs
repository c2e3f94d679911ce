use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.fivetran.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SCHEMA_CONFLICT_BACKOFF_MS: u64 = 1_000;

/// Harness configuration, loaded from `api-mock.toml` or built in code
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarnessConfig {
    /// Base URL requests are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout for the real transport
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Delay between retries after an optimistic-lock conflict
    #[serde(default = "default_schema_conflict_backoff_ms")]
    pub schema_conflict_backoff_ms: u64,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// API key pair sent as basic auth
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

/// Environment variables the test bootstrap fills in when absent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_acceptance_env")]
    pub acceptance_env: String,
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_schema_conflict_backoff_ms() -> u64 {
    DEFAULT_SCHEMA_CONFLICT_BACKOFF_MS
}

fn default_acceptance_env() -> String {
    "TF_ACC".to_string()
}

fn default_key_env() -> String {
    "FIVETRAN_API_KEY".to_string()
}

fn default_secret_env() -> String {
    "FIVETRAN_API_SECRET".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            schema_conflict_backoff_ms: default_schema_conflict_backoff_ms(),
            credentials: Credentials::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            api_key: "test_api_key".to_string(),
            api_secret: "test_api_secret".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            acceptance_env: default_acceptance_env(),
            key_env: default_key_env(),
            secret_env: default_secret_env(),
        }
    }
}

impl HarnessConfig {
    /// Base URL parsed as a URL
    pub fn parsed_base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn schema_conflict_backoff(&self) -> Duration {
        Duration::from_millis(self.schema_conflict_backoff_ms)
    }
}
