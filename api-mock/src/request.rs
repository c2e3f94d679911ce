//! Request introspection helpers for use inside handler closures

use crate::error::{MockError, Result};
use crate::types::ApiRequest;
use serde_json::Value;
use std::io::Read;

fn read_body(request: &mut ApiRequest) -> Result<Vec<u8>> {
    request.body.rewind();
    let mut bytes = Vec::new();
    let read = request.body.read_to_end(&mut bytes);
    request.body.rewind();
    read?;
    Ok(bytes)
}

/// Read and parse the request body as JSON, leaving the body readable again
///
/// An empty body is an error.
pub fn try_decode_request_body(request: &mut ApiRequest) -> Result<Value> {
    let bytes = read_body(request)?;
    if bytes.is_empty() {
        return Err(MockError::general("empty body"));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Like [`try_decode_request_body`], for endpoints where the body is optional
pub fn decode_optional_request_body(request: &mut ApiRequest) -> Result<Option<Value>> {
    let bytes = read_body(request)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Read and parse the request body as JSON, failing the running test on malformed input
///
/// # Panics
///
/// Panics with the caller's location if the body is unreadable, empty or not valid JSON.
#[track_caller]
pub fn decode_request_body(request: &mut ApiRequest) -> Value {
    match try_decode_request_body(request) {
        Ok(value) => value,
        Err(err) => panic!(
            "Failed to decode body of {} {}: {}\nBody: {}",
            request.method,
            request.path(),
            err,
            String::from_utf8_lossy(request.body.as_bytes())
        ),
    }
}

/// First value of a query parameter
pub fn query_param(request: &ApiRequest, name: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Non-empty path segments, e.g. `["v1", "groups", "group_id"]`
pub fn path_segments(request: &ApiRequest) -> Vec<String> {
    request
        .url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
