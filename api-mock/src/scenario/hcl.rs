//! Minimal readers for the HCL rendered by [`super::SchemaConfigTestData::tf_config`]

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*"([^"]+)"\s*=\s*\{\s*$"#).expect("Invalid regex"));
static OPENS_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\s*$").expect("Invalid regex"));
static CLOSES_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\}\s*$").expect("Invalid regex"));

/// Every quoted map key that opens a block, in document order
pub fn hcl_block_keys(config: &str) -> Vec<String> {
    config
        .lines()
        .filter_map(|line| QUOTED_BLOCK.captures(line))
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Dotted paths of nested quoted blocks, e.g. `schema_1.table_1.column_1`
///
/// Unquoted blocks such as `tables = {` contribute nesting but no path
/// segment.
pub fn hcl_entity_paths(config: &str) -> Vec<String> {
    let mut stack: Vec<Option<String>> = Vec::new();
    let mut paths = Vec::new();

    for line in config.lines() {
        if let Some(captures) = QUOTED_BLOCK.captures(line) {
            stack.push(Some(captures[1].to_string()));
            paths.push(
                stack
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("."),
            );
        } else if OPENS_BLOCK.is_match(line) {
            stack.push(None);
        } else if CLOSES_BLOCK.is_match(line) {
            stack.pop();
        }
    }

    paths
}
