//! Line diffs of JSON values for assertion failure messages

use prettydiff::{basic::DiffOp, diff_slice};
use serde_json::Value;

/// Pretty-print a value, falling back to compact form
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Unified-style diff between the pretty forms of `expected` and `actual`
///
/// Lines only in `expected` are prefixed `-`, lines only in `actual` `+`.
pub fn render_json_diff(expected: &Value, actual: &Value) -> String {
    let expected = pretty(expected);
    let actual = pretty(actual);
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();

    let diff = diff_slice(&expected_lines, &actual_lines);
    let mut out = String::new();

    for op in diff.diff {
        match op {
            DiffOp::Equal(lines) => push_lines(&mut out, ' ', lines),
            DiffOp::Remove(lines) => push_lines(&mut out, '-', lines),
            DiffOp::Insert(lines) => push_lines(&mut out, '+', lines),
            DiffOp::Replace(removed, inserted) => {
                push_lines(&mut out, '-', removed);
                push_lines(&mut out, '+', inserted);
            }
        }
    }

    out
}

fn push_lines(out: &mut String, marker: char, lines: &[&str]) {
    for line in lines {
        out.push(marker);
        out.push(' ');
        out.push_str(line);
        out.push('\n');
    }
}
