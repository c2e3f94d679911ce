//! Typed accessors over generic JSON values
//!
//! Handlers and scenario code walk decoded bodies through these helpers
//! instead of unchecked indexing, so a malformed body surfaces as a
//! [`MockError`] naming the offending key.

use crate::error::{MockError, Result};
use serde_json::{Map, Value};

/// Short name of a JSON value's kind, used in error messages
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A value is empty when it is null, an empty string, an empty array or an empty object
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Deep equality where numbers compare by numeric value (`1 == 1.0`)
pub fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => left == right,
    }
}

fn unexpected(key: &str, expected: &'static str, actual: &Value) -> MockError {
    MockError::UnexpectedType {
        pointer: key.to_string(),
        expected,
        actual: kind_name(actual),
    }
}

/// Result-returning accessors for JSON objects
pub trait JsonExt {
    /// View the value as an object
    fn as_object_or_err(&self) -> Result<&Map<String, Value>>;

    /// Required field of an object
    fn field(&self, key: &str) -> Result<&Value>;

    /// Required string field
    fn str_field(&self, key: &str) -> Result<&str>;

    /// Required boolean field
    fn bool_field(&self, key: &str) -> Result<bool>;

    /// Required array field
    fn array_field(&self, key: &str) -> Result<&Vec<Value>>;

    /// Required object field
    fn object_field(&self, key: &str) -> Result<&Map<String, Value>>;

    /// Optional boolean field; absent and null both read as `None`
    fn opt_bool_field(&self, key: &str) -> Result<Option<bool>>;

    /// Optional string field; absent and null both read as `None`
    fn opt_str_field(&self, key: &str) -> Result<Option<&str>>;
}

impl JsonExt for Value {
    fn as_object_or_err(&self) -> Result<&Map<String, Value>> {
        self.as_object().ok_or_else(|| unexpected("", "object", self))
    }

    fn field(&self, key: &str) -> Result<&Value> {
        self.as_object_or_err()?
            .get(key)
            .ok_or_else(|| MockError::MissingKey {
                key: key.to_string(),
            })
    }

    fn str_field(&self, key: &str) -> Result<&str> {
        let value = self.field(key)?;
        value.as_str().ok_or_else(|| unexpected(key, "string", value))
    }

    fn bool_field(&self, key: &str) -> Result<bool> {
        let value = self.field(key)?;
        value.as_bool().ok_or_else(|| unexpected(key, "bool", value))
    }

    fn array_field(&self, key: &str) -> Result<&Vec<Value>> {
        let value = self.field(key)?;
        value.as_array().ok_or_else(|| unexpected(key, "array", value))
    }

    fn object_field(&self, key: &str) -> Result<&Map<String, Value>> {
        let value = self.field(key)?;
        value.as_object().ok_or_else(|| unexpected(key, "object", value))
    }

    fn opt_bool_field(&self, key: &str) -> Result<Option<bool>> {
        match self.as_object_or_err()?.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| unexpected(key, "bool", value)),
        }
    }

    fn opt_str_field(&self, key: &str) -> Result<Option<&str>> {
        match self.as_object_or_err()?.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| unexpected(key, "string", value)),
        }
    }
}
