use crate::config::HarnessConfig;
use crate::error::{MockError, Result};
use crate::traits::HttpClient;
use crate::types::{ApiRequest, ApiResponse};
use reqwest::{Client, Response};
use std::collections::HashMap;
use url::Url;

/// Network transport backed by reqwest
///
/// Lets the same system under test run against a real (or wiremock) server
/// instead of the in-process registry.
#[derive(Clone)]
pub struct ReqwestClient {
    client: Client,
    base_url: Url,
}

impl ReqwestClient {
    /// Create a new client from harness configuration
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.parsed_base_url()?,
        })
    }

    fn build_request(&self, request: &ApiRequest) -> Result<reqwest::Request> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.as_bytes().to_vec());
        }

        builder.build().map_err(Into::into)
    }
}

/// Headers whose values are not valid UTF-8 are dropped
async fn into_api_response(response: Response, request: &ApiRequest) -> Result<ApiResponse> {
    let status = response.status().as_u16();
    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
        })
        .collect();
    let body = response.text().await?;

    let mut converted = ApiResponse::new(status, body).for_request(request);
    converted.headers = headers;
    Ok(converted)
}

impl HttpClient for ReqwestClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let http_request = self.build_request(&request)?;
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.client.execute(http_request).await.map_err(|e| {
            MockError::transport(format!(
                "{} {} failed: {}",
                request.method, request.url, e
            ))
        })?;

        into_api_response(response, &request).await
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}
