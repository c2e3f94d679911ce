//! Flattened resource state for import-style checks
//!
//! Attributes follow the flatmap convention: nested keys are joined with
//! `.`, lists record their length under `key.#` and maps under `key.%`.

use serde_json::Value;
use std::collections::BTreeMap;

/// State of one resource instance after an import or refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl ResourceState {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Flatten a JSON object into attributes; `id` is also stored as an attribute
    pub fn from_json<S: Into<String>>(id: S, value: &Value) -> Self {
        let mut state = Self::new(id);
        flatten_into(&mut state.attributes, "", value);
        state
            .attributes
            .insert("id".to_string(), state.id.clone());
        state
    }

    #[must_use]
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            if !prefix.is_empty() {
                out.insert(join(prefix, "%"), map.len().to_string());
            }
            for (key, nested) in map {
                flatten_into(out, &join(prefix, key), nested);
            }
        }
        Value::Array(items) => {
            out.insert(join(prefix, "#"), items.len().to_string());
            for (index, nested) in items.iter().enumerate() {
                flatten_into(out, &join(prefix, &index.to_string()), nested);
            }
        }
        // null attributes are absent from state
        Value::Null => {}
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Bool(_) | Value::Number(_) => {
            out.insert(prefix.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_values() {
        let state = ResourceState::from_json(
            "group_id",
            &json!({
                "name": "group",
                "enabled": true,
                "tags": ["a", "b"],
                "config": {"port": 5432, "password": null}
            }),
        );

        assert_eq!(state.attribute("id"), Some("group_id"));
        assert_eq!(state.attribute("name"), Some("group"));
        assert_eq!(state.attribute("enabled"), Some("true"));
        assert_eq!(state.attribute("tags.#"), Some("2"));
        assert_eq!(state.attribute("tags.1"), Some("b"));
        assert_eq!(state.attribute("config.%"), Some("2"));
        assert_eq!(state.attribute("config.port"), Some("5432"));
        assert_eq!(state.attribute("config.password"), None);
    }
}
