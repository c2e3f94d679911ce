use crate::config::types::{Credentials, HarnessConfig};
use crate::config::validator::ConfigValidatorImpl;
use crate::error::{MockError, Result};
use crate::traits::ConfigValidator;
use std::env;
use std::path::Path;

/// Configuration loader trait
pub trait ConfigLoader {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<HarnessConfig>;
    fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<HarnessConfig>;
}

/// Default configuration loader implementation
pub struct DefaultConfigLoader;

impl ConfigLoader for DefaultConfigLoader {
    /// Load configuration from an api-mock.toml file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<HarnessConfig> {
        let content = std::fs::read_to_string(&path).map_err(|_| MockError::ConfigNotFound {
            path: path.as_ref().to_path_buf(),
        })?;

        let config: HarnessConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load and validate configuration with file context in errors
    fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<HarnessConfig> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(MockError::ConfigNotFound {
                path: path_ref.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path_ref)?;
        let config: HarnessConfig = toml::from_str(&content).map_err(|e| {
            MockError::invalid_config(format!(
                "Failed to parse TOML in {}: {}",
                path_ref.display(),
                e
            ))
        })?;

        ConfigValidatorImpl::new().validate_with_context(&config, path_ref)?;
        Ok(config)
    }
}

/// Make sure the acceptance flag and API credentials are present in the environment
///
/// Variables that are already set are left alone. Returns the credentials
/// now visible in the environment.
pub fn bootstrap_env(config: &HarnessConfig) -> Credentials {
    let bootstrap = &config.bootstrap;
    set_if_absent(&bootstrap.acceptance_env, "1");
    set_if_absent(&bootstrap.key_env, &config.credentials.api_key);
    set_if_absent(&bootstrap.secret_env, &config.credentials.api_secret);

    Credentials {
        api_key: env::var(&bootstrap.key_env)
            .unwrap_or_else(|_| config.credentials.api_key.clone()),
        api_secret: env::var(&bootstrap.secret_env)
            .unwrap_or_else(|_| config.credentials.api_secret.clone()),
    }
}

fn set_if_absent(name: &str, value: &str) {
    if env::var_os(name).is_none() {
        tracing::debug!(variable = name, "setting test environment variable");
        env::set_var(name, value);
    }
}

// Convenience functions maintaining the API
impl HarnessConfig {
    /// Create a new config builder
    pub fn builder() -> crate::config::builder::HarnessConfigBuilder {
        crate::config::builder::HarnessConfigBuilder::new()
    }

    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_from_file(path)
    }

    /// Load and validate configuration from file
    pub fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_with_validation(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ConfigValidatorImpl::new().validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api-mock.toml");
        fs::write(
            &path,
            r#"
base_url = "https://mock.local"
schema_conflict_backoff_ms = 5

[credentials]
api_key = "key"
api_secret = "secret"
"#,
        )
        .unwrap();

        let config = HarnessConfig::load_with_validation(&path).unwrap();
        assert_eq!(config.base_url, "https://mock.local");
        assert_eq!(config.schema_conflict_backoff().as_millis(), 5);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.bootstrap.acceptance_env, "TF_ACC");
        assert_eq!(config.credentials.api_key, "key");
    }

    #[test]
    fn test_missing_file() {
        let err = HarnessConfig::load_with_validation("/nonexistent/api-mock.toml").unwrap_err();
        assert!(matches!(err, MockError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_invalid_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api-mock.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = HarnessConfig::load_with_validation(&path).unwrap_err();
        assert!(err.to_string().contains("api-mock.toml"));
    }

    #[test]
    fn test_bootstrap_keeps_existing_values() {
        let mut config = HarnessConfig::default();
        config.bootstrap.acceptance_env = "API_MOCK_TEST_ACC".to_string();
        config.bootstrap.key_env = "API_MOCK_TEST_KEY".to_string();
        config.bootstrap.secret_env = "API_MOCK_TEST_SECRET".to_string();
        env::set_var("API_MOCK_TEST_KEY", "preset_key");

        let credentials = bootstrap_env(&config);
        assert_eq!(credentials.api_key, "preset_key");
        assert_eq!(credentials.api_secret, "test_api_secret");
        assert_eq!(env::var("API_MOCK_TEST_ACC").unwrap(), "1");
    }
}
