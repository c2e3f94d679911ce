use crate::client::ApiClient;
use crate::config::{bootstrap_env, Credentials, HarnessConfig};
use crate::error::Result;
use crate::logging::{init_tracing, TracingMode};
use crate::routing::MockHttpClient;

/// Everything one test needs: configuration, credentials and a fresh mock client
///
/// Each test builds its own context, so route registrations never leak
/// between tests and tests can run in parallel.
#[derive(Clone)]
pub struct TestContext {
    config: HarnessConfig,
    credentials: Credentials,
    mock: MockHttpClient,
}

impl TestContext {
    /// Context over the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HarnessConfig::default())
    }

    /// Context over an explicit configuration, with compact tracing
    ///
    /// Sets the acceptance flag and fake credentials in the environment when
    /// they are absent.
    pub fn with_config(config: HarnessConfig) -> Result<Self> {
        Self::with_tracing(config, TracingMode::Compact)
    }

    /// Context over an explicit configuration and tracing mode
    ///
    /// The mode applies only if tracing is not yet initialized in this process.
    pub fn with_tracing(config: HarnessConfig, tracing_mode: TracingMode) -> Result<Self> {
        init_tracing(tracing_mode);
        config.validate()?;

        let credentials = bootstrap_env(&config);
        let mock = MockHttpClient::from_config(&config)?;
        mock.reset();

        Ok(Self {
            config,
            credentials,
            mock,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The mock transport; clones share routes with this context
    pub fn mock(&self) -> &MockHttpClient {
        &self.mock
    }

    /// API client wired to the mock transport
    pub fn api_client(&self) -> ApiClient<MockHttpClient> {
        ApiClient::with_http_client(self.mock.clone(), self.credentials.clone())
    }

    /// Drop every route and recorded interaction
    pub fn reset(&self) {
        self.mock.reset();
    }
}
