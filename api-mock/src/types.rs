use crate::error::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use url::Url;
use uuid::Uuid;

/// Readable request body that can be rewound after consumption
///
/// Handlers read the body like a stream; introspection helpers rewind it so
/// the next reader sees the full content again.
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    cursor: Cursor<Vec<u8>>,
}

impl RequestBody {
    /// Create a body from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Create an empty body
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the body has no content at all
    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Number of bytes not yet consumed by readers
    pub fn remaining(&self) -> usize {
        let total = self.cursor.get_ref().len();
        total.saturating_sub(self.cursor.position() as usize)
    }

    /// Full body content, independent of the read position
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Reset the read position to the start of the body
    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }
}

impl Read for RequestBody {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

/// HTTP request as seen by a transport or a mock handler
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Correlation id copied onto the response
    pub id: Uuid,
    pub method: Method,
    pub url: Url,
    /// Header names are stored lowercase
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
    pub received_at: DateTime<Utc>,
}

impl ApiRequest {
    /// Create a new request without headers or body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            url,
            headers: HashMap::new(),
            body: RequestBody::empty(),
            received_at: Utc::now(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Replace the body with raw bytes
    #[must_use]
    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = RequestBody::new(body.into());
        self
    }

    /// Replace the body with serialized JSON and set the content type
    pub fn with_json(self, value: &serde_json::Value) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self
            .with_header("content-type", "application/json")
            .with_body(bytes))
    }

    /// Request path without query string
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// HTTP response data with correlation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub url: String,
    /// Id of the request this response answers, when known
    pub request_id: Option<Uuid>,
}

impl ApiResponse {
    /// Create a new response with a body and no headers
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
            url: String::new(),
            request_id: None,
        }
    }

    /// Associate the response with the request that produced it
    #[must_use]
    pub fn for_request(mut self, request: &ApiRequest) -> Self {
        self.url = request.url.to_string();
        self.request_id = Some(request.id);
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Check if the response indicates an error (non-2xx status code)
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Parse the body as generic JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
