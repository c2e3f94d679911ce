use crate::config::Credentials;
use crate::envelope::ApiEnvelope;
use crate::error::{MockError, Result};
use crate::json::JsonExt;
use crate::traits::HttpClient;
use crate::types::ApiRequest;
use base64::prelude::*;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Envelope-aware API client over an injectable transport
///
/// This is the seam a system under test is built on: production code hands
/// it a [`crate::http::ReqwestClient`], tests hand it a
/// [`crate::MockHttpClient`].
#[derive(Clone)]
pub struct ApiClient<C: HttpClient> {
    http: C,
    credentials: Credentials,
}

impl<C: HttpClient> ApiClient<C> {
    /// Create a client sending through `http`
    pub fn with_http_client(http: C, credentials: Credentials) -> Self {
        Self { http, credentials }
    }

    pub fn http_client(&self) -> &C {
        &self.http
    }

    /// Resolve an API path such as `/v1/groups` against the transport's base URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.http.base_url().join(path)?)
    }

    /// Build an authenticated request, serializing `body` as JSON when given
    pub fn build_request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<ApiRequest> {
        let token = BASE64_STANDARD.encode(format!(
            "{}:{}",
            self.credentials.api_key, self.credentials.api_secret
        ));
        let request = ApiRequest::new(method, url)
            .with_header("authorization", format!("Basic {}", token))
            .with_header("accept", "application/json");

        match body {
            Some(body) => request.with_json(body),
            None => Ok(request),
        }
    }

    /// Send a request and unwrap the envelope; non-2xx statuses become [`MockError::Api`]
    pub async fn send_to(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<ApiEnvelope> {
        let request = self.build_request(method, url, body)?;
        let response = self.http.execute(request).await?;

        let envelope = match response.envelope() {
            Ok(envelope) => envelope,
            Err(_) if response.is_error() => {
                return Err(MockError::Api {
                    status: response.status,
                    code: String::new(),
                    message: response.body,
                })
            }
            Err(err) => return Err(err),
        };

        if response.is_error() {
            return Err(MockError::Api {
                status: response.status,
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }
        Ok(envelope)
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiEnvelope> {
        let url = self.url_for(path)?;
        self.send_to(method, url, body).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiEnvelope> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiEnvelope> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<ApiEnvelope> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiEnvelope> {
        self.send(Method::DELETE, path, None).await
    }

    /// Follow `next_cursor` until exhausted and collect every item
    ///
    /// A cursor served twice is an error rather than an endless loop.
    pub async fn list_all(&self, path: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let mut url = self.url_for(path)?;
            if let Some(cursor) = &cursor {
                url.query_pairs_mut().append_pair("cursor", cursor);
            }

            let envelope = self.send_to(Method::GET, url, None).await?;
            let data = envelope.data.unwrap_or(Value::Null);
            items.extend(data.array_field("items")?.iter().cloned());

            match data.opt_str_field("next_cursor")? {
                Some(next) if !next.is_empty() => {
                    if !seen.insert(next.to_string()) {
                        return Err(MockError::general(format!(
                            "{} returned cursor '{}' twice",
                            path, next
                        )));
                    }
                    cursor = Some(next.to_string());
                }
                _ => break,
            }
        }

        Ok(items)
    }
}
