//! Response builder for the API's uniform `{code, message?, data?}` envelope

use crate::error::{MockError, Result};
use crate::request::query_param;
use crate::types::{ApiRequest, ApiResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Status code vocabulary carried in the envelope's `code` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCode {
    Success,
    Conflict,
    Forbidden,
    BadRequest,
    InvalidInput,
    /// Rendered as `NotFound_<entity>`, e.g. `NotFound_SchemaConfig`
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Conflict => write!(f, "Conflict"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::BadRequest => write!(f, "BadRequest"),
            Self::InvalidInput => write!(f, "InvalidInput"),
            Self::NotFound(entity) if entity.is_empty() => write!(f, "NotFound"),
            Self::NotFound(entity) => write!(f, "NotFound_{}", entity),
            Self::Other(code) => write!(f, "{}", code),
        }
    }
}

impl From<&str> for ApiCode {
    fn from(code: &str) -> Self {
        match code {
            "Success" => Self::Success,
            "Conflict" => Self::Conflict,
            "Forbidden" => Self::Forbidden,
            "BadRequest" => Self::BadRequest,
            "InvalidInput" => Self::InvalidInput,
            "NotFound" => Self::NotFound(String::new()),
            other => match other.strip_prefix("NotFound_") {
                Some(entity) => Self::NotFound(entity.to_string()),
                None => Self::Other(other.to_string()),
            },
        }
    }
}

impl From<String> for ApiCode {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

/// The envelope every mocked endpoint answers with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Parsed form of the `code` field
    pub fn api_code(&self) -> ApiCode {
        ApiCode::from(self.code.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.api_code() == ApiCode::Success
    }
}

impl ApiResponse {
    /// Parse the body as an API envelope
    pub fn envelope(&self) -> Result<ApiEnvelope> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Build a response carrying an envelope with the given status and code
///
/// `message` and `data` are left out of the serialized body when `None`;
/// so is `data` holding JSON `null`.
pub fn build_response<C: Into<ApiCode>>(
    request: &ApiRequest,
    status: u16,
    code: C,
    message: Option<&str>,
    data: Option<Value>,
) -> Result<ApiResponse> {
    let envelope = ApiEnvelope {
        code: code.into().to_string(),
        message: message.map(str::to_string),
        data: data.filter(|value| !value.is_null()),
    };
    let body = serde_json::to_string(&envelope)?;

    Ok(ApiResponse::new(status, body)
        .with_header("content-type", "application/json")
        .for_request(request))
}

/// Build a response with `code = "Success"`
pub fn build_success_response(
    request: &ApiRequest,
    status: u16,
    message: Option<&str>,
    data: Option<Value>,
) -> Result<ApiResponse> {
    build_response(request, status, ApiCode::Success, message, data)
}

/// Body of a cursor-paged list endpoint
pub fn paged_data(items: Vec<Value>, next_cursor: Option<&str>) -> Value {
    let mut data = json!({ "items": items });
    if let Some(cursor) = next_cursor {
        data["next_cursor"] = Value::String(cursor.to_string());
    }
    data
}

const CURSOR_PREFIX: &str = "cursor_";

/// Serves a fixed item list page by page, keyed by the `cursor` query parameter
#[derive(Debug, Clone)]
pub struct Paginator {
    items: Vec<Value>,
    page_size: usize,
}

impl Paginator {
    /// Create a paginator; a zero page size is treated as one
    pub fn new(items: Vec<Value>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages a full listing takes (an empty list still takes one call)
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    /// Page data starting at the position encoded in `cursor`
    pub fn page(&self, cursor: Option<&str>) -> Result<Value> {
        let offset = match cursor {
            None => 0,
            Some(raw) => raw
                .strip_prefix(CURSOR_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n <= self.items.len())
                .ok_or_else(|| MockError::general(format!("Invalid cursor '{}'", raw)))?,
        };

        let end = (offset + self.page_size).min(self.items.len());
        let next = (end < self.items.len()).then(|| format!("{}{}", CURSOR_PREFIX, end));
        Ok(paged_data(
            self.items[offset..end].to_vec(),
            next.as_deref(),
        ))
    }

    /// Answer a list request; unknown cursors get a 400 `BadRequest` envelope
    pub fn respond(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let cursor = query_param(request, "cursor");
        match self.page(cursor.as_deref()) {
            Ok(data) => build_success_response(request, 200, None, Some(data)),
            Err(err) => build_response(
                request,
                400,
                ApiCode::BadRequest,
                Some(&err.to_string()),
                None,
            ),
        }
    }
}
