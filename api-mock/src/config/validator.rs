use crate::config::types::HarnessConfig;
use crate::error::{MockError, Result};
use crate::traits::ConfigValidator;
use std::path::Path;

/// Configuration validator implementation
pub struct ConfigValidatorImpl;

impl ConfigValidator for ConfigValidatorImpl {
    type Config = HarnessConfig;

    /// Validate configuration (uses enhanced validation with default context)
    fn validate(&self, config: &HarnessConfig) -> Result<()> {
        self.validate_with_context(config, "configuration")
    }
}

impl Default for ConfigValidatorImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidatorImpl {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validation with the config source named in errors
    pub fn validate_with_context<P: AsRef<Path>>(
        &self,
        config: &HarnessConfig,
        config_path: P,
    ) -> Result<()> {
        let config_path_str = config_path.as_ref().to_string_lossy();

        let base_url = url::Url::parse(&config.base_url).map_err(|_| {
            MockError::invalid_config(format!(
                "Invalid base_url '{}' in {}. Must be a valid URL.",
                config.base_url, config_path_str
            ))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(MockError::invalid_config(format!(
                "base_url '{}' in {} must use http or https",
                config.base_url, config_path_str
            )));
        }

        if config.timeout_seconds == 0 {
            return Err(MockError::invalid_config(format!(
                "timeout_seconds in {} must be greater than 0",
                config_path_str
            )));
        }

        if config.credentials.api_key.is_empty() || config.credentials.api_secret.is_empty() {
            return Err(MockError::invalid_config(format!(
                "Both credentials.api_key and credentials.api_secret must be set in {}",
                config_path_str
            )));
        }

        let bootstrap = &config.bootstrap;
        for name in [
            &bootstrap.acceptance_env,
            &bootstrap.key_env,
            &bootstrap.secret_env,
        ] {
            if name.is_empty() || name.contains('=') {
                return Err(MockError::invalid_config(format!(
                    "Invalid environment variable name '{}' in bootstrap section of {}",
                    name, config_path_str
                )));
            }
        }

        Ok(())
    }
}
