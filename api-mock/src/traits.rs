use crate::error::Result;
use crate::types::{ApiRequest, ApiResponse};
use std::future::Future;
use url::Url;

/// Transport a system under test sends its API calls through
///
/// Implemented by the in-process [`crate::MockHttpClient`] and by the real
/// [`crate::http::ReqwestClient`], so either can be injected.
pub trait HttpClient: Send + Sync + Clone {
    /// Send a request and return the raw response
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;

    /// Base URL request paths are resolved against
    fn base_url(&self) -> &Url;
}

/// Trait for configuration validation
pub trait ConfigValidator: Send + Sync {
    type Config;

    /// Validate configuration
    fn validate(&self, config: &Self::Config) -> Result<()>;
}
