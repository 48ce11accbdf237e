//! Deep equality and mismatch rendering.
//!
//! The [`Comparator`] trait is the seam for alternative equality semantics.
//! [`DeepEqual`] is the default: structural equality over JSON values, where
//! numbers compare by numeric value and object key order is irrelevant.
//! Mismatches are described in the familiar assertion-library style:
//!
//! ```text
//! expected 'abc' to deeply equal 'abd'
//! expected { Object (personId, homeState, ...) } to deeply equal { a: 1 }
//! ```

pub mod assertion;
pub mod verify;

use serde_json::{Map, Number, Value};

pub use assertion::{
    Assertion, AssertionError, AssertionResult, should_be_falsy, should_be_truthy, should_be_unreachable,
    should_equal,
};
pub use verify::verify;

/// Default length at which compound values are summarised.
pub const DEFAULT_TRUNCATE_THRESHOLD: usize = 40;

/// Nesting depth rendered before members collapse to `[Object]`/`[Array]`.
const INSPECT_DEPTH: i32 = 2;

/// Single-line renderings longer than this are broken across lines.
const SINGLE_LINE_LIMIT: usize = 60;

/// Equality collaborator used during verification.
pub trait Comparator {
    /// Whether `actual` matches `expected`.
    fn equals(&self, actual: &Value, expected: &Value) -> bool;

    /// Human-readable description of a mismatch.
    fn diff(&self, actual: &Value, expected: &Value) -> String;
}

/// Structural deep equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepEqual {
    truncate_threshold: usize,
}

impl Default for DeepEqual {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepEqual {
    /// Create with the default truncation threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            truncate_threshold: DEFAULT_TRUNCATE_THRESHOLD,
        }
    }

    /// Set the truncation threshold. `0` disables summarising.
    #[must_use]
    pub const fn with_truncate_threshold(mut self, threshold: usize) -> Self {
        self.truncate_threshold = threshold;
        self
    }

    /// The truncation threshold.
    #[must_use]
    pub const fn truncate_threshold(&self) -> usize {
        self.truncate_threshold
    }

    /// Render a value for a diff message, summarising long compounds.
    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        let full = inspect(value, INSPECT_DEPTH);
        if self.truncate_threshold == 0 || full.len() < self.truncate_threshold {
            return full;
        }
        match value {
            Value::Array(items) => format!("[ Array({}) ]", items.len()),
            Value::Object(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                let listed = if keys.len() > 2 {
                    format!("{}, ...", keys[..2].join(", "))
                } else {
                    keys.join(", ")
                };
                format!("{{ Object ({listed}) }}")
            }
            _ => full,
        }
    }
}

impl Comparator for DeepEqual {
    fn equals(&self, actual: &Value, expected: &Value) -> bool {
        deep_equal(actual, expected)
    }

    fn diff(&self, actual: &Value, expected: &Value) -> String {
        format!(
            "expected {} to deeply equal {}",
            self.render(actual),
            self.render(expected)
        )
    }
}

/// Structural equality over JSON values.
///
/// Numbers are equal when numerically equal (`1 == 1.0`); objects are equal
/// when they hold the same keys with equal values, in any order.
#[must_use]
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        #[allow(clippy::float_cmp)]
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn inspect(value: &Value, depth: i32) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            if depth < 0 {
                return "[Array]".to_string();
            }
            let parts: Vec<String> = items.iter().map(|item| inspect(item, depth - 1)).collect();
            join_compound(&parts, '[', ']')
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            if depth < 0 {
                return "[Object]".to_string();
            }
            join_compound(&object_parts(map, depth), '{', '}')
        }
    }
}

fn object_parts(map: &Map<String, Value>, depth: i32) -> Vec<String> {
    map.iter()
        .map(|(key, value)| {
            let key = if is_identifier(key) {
                key.clone()
            } else {
                quote(key)
            };
            format!("{key}: {}", inspect(value, depth - 1))
        })
        .collect()
}

fn join_compound(parts: &[String], open: char, close: char) -> String {
    let length: usize = parts.iter().map(|p| p.len() + 1).sum();
    let separator = if length > SINGLE_LINE_LIMIT { ",\n  " } else { ", " };
    format!("{open} {} {close}", parts.join(separator))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Single-quote a string the way assertion messages show it.
fn quote(s: &str) -> String {
    let escaped = Value::String(s.to_string()).to_string();
    let inner = &escaped[1..escaped.len() - 1];
    format!("'{}'", inner.replace('\'', "\\'").replace("\\\"", "\""))
}
