use crate::config::types::{Credentials, HarnessConfig};
use crate::error::Result;

/// Builder for HarnessConfig to improve API ergonomics
pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessConfigBuilder {
    /// Create a new config builder starting from defaults
    pub fn new() -> Self {
        Self {
            config: HarnessConfig::default(),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set timeout in seconds
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = seconds;
        self
    }

    /// Set the conflict retry backoff in milliseconds
    #[must_use]
    pub fn schema_conflict_backoff_ms(mut self, millis: u64) -> Self {
        self.config.schema_conflict_backoff_ms = millis;
        self
    }

    /// Set the API credentials
    #[must_use]
    pub fn credentials<S: Into<String>>(mut self, api_key: S, api_secret: S) -> Self {
        self.config.credentials = Credentials {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        };
        self
    }

    /// Set the name of the acceptance-test flag variable
    #[must_use]
    pub fn acceptance_env<S: Into<String>>(mut self, name: S) -> Self {
        self.config.bootstrap.acceptance_env = name.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<HarnessConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = HarnessConfig::builder()
            .base_url("http://127.0.0.1:9000")
            .timeout(5)
            .schema_conflict_backoff_ms(1)
            .credentials("key", "secret")
            .build()
            .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout().as_secs(), 5);
        assert_eq!(config.schema_conflict_backoff_ms, 1);
        assert_eq!(config.credentials.api_secret, "secret");
    }

    #[test]
    fn test_builder_validates() {
        assert!(HarnessConfig::builder().timeout(0).build().is_err());
    }
}
