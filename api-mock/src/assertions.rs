//! Assertion helpers over decoded JSON values.
//!
//! Every `assert_*` function fails the current test by panicking; they are
//! `#[track_caller]`, so the reported location is the test line that made
//! the assertion rather than this module. The `check_*` forms return the
//! failure message instead, for callers that need to branch on the outcome.

use crate::diff::{pretty, render_json_diff};
use crate::error::{MockError, Result};
use crate::json::{is_empty_value, json_eq, kind_name};
use crate::state::ResourceState;
use serde_json::{Map, Value};
use std::panic::Location;

/// Deep equality where numbers compare by value
pub fn check_equal(actual: &Value, expected: &Value) -> std::result::Result<(), String> {
    if json_eq(actual, expected) {
        return Ok(());
    }
    Err(format!(
        "Values are not equal.\nExpected: {}\nActual:   {}\nDiff (- expected, + actual):\n{}",
        expected,
        actual,
        render_json_diff(expected, actual)
    ))
}

/// Assert deep structural equality.
///
/// # Panics
///
/// Panics with both values and a line diff when they differ.
#[track_caller]
pub fn assert_equal(actual: &Value, expected: &Value) {
    if let Err(message) = check_equal(actual, expected) {
        panic!("{}", message);
    }
}

/// Assert a value is null, an empty string, an empty array or an empty object.
///
/// # Panics
///
/// Panics if the value is not empty.
#[track_caller]
pub fn assert_empty(value: &Value) {
    assert!(
        is_empty_value(value),
        "Expected empty value but got {}: {}",
        kind_name(value),
        pretty(value)
    );
}

/// Assert a value is not empty.
///
/// # Panics
///
/// Panics if the value is null, an empty string, an empty array or an empty object.
#[track_caller]
pub fn assert_not_empty(value: &Value) {
    assert!(
        !is_empty_value(value),
        "Expected non-empty value but got {}: {}",
        kind_name(value),
        value
    );
}

#[track_caller]
fn as_map(value: &Value) -> &Map<String, Value> {
    match value.as_object() {
        Some(map) => map,
        None => panic!(
            "Expected a JSON object but got {}: {}",
            kind_name(value),
            value
        ),
    }
}

/// Assert `key` is present and return its value for chaining.
///
/// # Panics
///
/// Panics if `map` is not an object or lacks `key`.
#[track_caller]
pub fn assert_key_exists<'a>(map: &'a Value, key: &str) -> &'a Value {
    let object = as_map(map);
    match object.get(key) {
        Some(value) => value,
        None => panic!(
            "Expected key '{}' to exist. Available keys: [{}]",
            key,
            object.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Assert `key` is absent. A key present with a `null` value counts as present.
///
/// # Panics
///
/// Panics if `map` is not an object or contains `key`.
#[track_caller]
pub fn assert_key_does_not_exist(map: &Value, key: &str) {
    let object = as_map(map);
    if let Some(value) = object.get(key) {
        panic!(
            "Expected key '{}' to be absent but it is present with value {}",
            key, value
        );
    }
}

/// Assert `key` is present and equal to `expected`.
///
/// # Panics
///
/// Panics naming which part failed: the missing key or the mismatched value.
#[track_caller]
pub fn assert_key_exists_and_has_value(map: &Value, key: &str, expected: &Value) {
    let object = as_map(map);
    let Some(actual) = object.get(key) else {
        panic!(
            "Expected key '{}' with value {} but the key does not exist",
            key, expected
        );
    };
    if let Err(message) = check_equal(actual, expected) {
        panic!("Key '{}' has an unexpected value. {}", key, message);
    }
}

/// Order-independent comparison: lengths first, then every expected item must
/// be matched by a distinct actual item
pub fn check_array_items(actual: &[Value], expected: &[Value]) -> std::result::Result<(), String> {
    if actual.len() != expected.len() {
        return Err(format!(
            "Array sizes differ: expected {} items, got {}.\nExpected: {}\nActual:   {}",
            expected.len(),
            actual.len(),
            Value::Array(expected.to_vec()),
            Value::Array(actual.to_vec())
        ));
    }

    let mut unmatched: Vec<&Value> = actual.iter().collect();
    for item in expected {
        match unmatched.iter().position(|candidate| json_eq(candidate, item)) {
            Some(index) => {
                unmatched.swap_remove(index);
            }
            None => {
                return Err(format!(
                    "Expected item {} not found in actual array {}",
                    item,
                    Value::Array(actual.to_vec())
                ))
            }
        }
    }

    Ok(())
}

/// Assert two arrays hold the same items regardless of order.
///
/// # Panics
///
/// Panics on a size mismatch or when an expected item has no counterpart.
#[track_caller]
pub fn assert_array_items(actual: &[Value], expected: &[Value]) {
    if let Err(message) = check_array_items(actual, expected) {
        panic!("{}", message);
    }
}

/// Check run against the resource states produced by an import
pub type ImportStateCheck = Box<dyn Fn(&[ResourceState]) -> Result<()> + Send + Sync>;

/// Run checks in order, stopping at the first failure
///
/// The error names the failing check by 1-based index and the location the
/// composition was written at.
#[track_caller]
pub fn compose_import_state_check(checks: Vec<ImportStateCheck>) -> ImportStateCheck {
    let location = Location::caller();
    Box::new(move |states| {
        let total = checks.len();
        for (index, check) in checks.iter().enumerate() {
            if let Err(err) = check(states) {
                return Err(MockError::general(format!(
                    "check {}/{} error at {}:{}: {}",
                    index + 1,
                    total,
                    location.file(),
                    location.line(),
                    err
                )));
            }
        }
        Ok(())
    })
}

fn state_at(states: &[ResourceState], index: usize) -> Result<&ResourceState> {
    states.get(index).ok_or_else(|| {
        MockError::general(format!(
            "expected a resource at index {} but {} were imported",
            index,
            states.len()
        ))
    })
}

/// Check that attribute `key` of the `index`th state equals `value`
pub fn check_resource_attr(index: usize, key: &str, value: &str) -> ImportStateCheck {
    let key = key.to_string();
    let value = value.to_string();
    Box::new(move |states| {
        let state = state_at(states, index)?;
        match state.attribute(&key) {
            Some(actual) if actual == value => Ok(()),
            Some(actual) => Err(MockError::general(format!(
                "{}: attribute '{}' expected \"{}\", got \"{}\"",
                state.id, key, value, actual
            ))),
            None => Err(MockError::general(format!(
                "{}: attribute '{}' not found",
                state.id, key
            ))),
        }
    })
}

/// Check that attribute `key` of the `index`th state is set to a non-empty value
pub fn check_resource_attr_set(index: usize, key: &str) -> ImportStateCheck {
    let key = key.to_string();
    Box::new(move |states| {
        let state = state_at(states, index)?;
        match state.attribute(&key) {
            Some(actual) if !actual.is_empty() => Ok(()),
            _ => Err(MockError::general(format!(
                "{}: attribute '{}' expected to be set",
                state.id, key
            ))),
        }
    })
}

/// Check the number of imported resources
pub fn check_resource_count(expected: usize) -> ImportStateCheck {
    Box::new(move |states| {
        if states.len() == expected {
            Ok(())
        } else {
            Err(MockError::general(format!(
                "expected {} imported resources, got {}",
                expected,
                states.len()
            )))
        }
    })
}
