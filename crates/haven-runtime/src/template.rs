//! `{{path}}` template resolution.
//!
//! Templates are path lookups only: `{{ member.name }}` is replaced with the
//! string form of that variable. There are no filters, expressions or
//! defaults. A placeholder whose path is not set stays in the output verbatim
//! so unresolved bindings are visible.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::variables::{Variables, display};

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("placeholder pattern is valid"));

/// Resolve every placeholder in `text` against `vars`.
pub fn resolve(text: &str, vars: &Variables) -> String {
  if !text.contains("{{") {
    return text.to_string();
  }

  PLACEHOLDER
    .replace_all(text, |caps: &Captures| match vars.get(&caps[1]) {
      Some(value) => display(value),
      None => caps[0].to_string(),
    })
    .into_owned()
}

/// Resolve every string inside a JSON value, recursing into arrays and
/// objects. Object keys are left alone.
pub fn resolve_value(value: &Value, vars: &Variables) -> Value {
  match value {
    Value::String(s) => Value::String(resolve(s, vars)),
    Value::Array(items) => Value::Array(items.iter().map(|v| resolve_value(v, vars)).collect()),
    Value::Object(map) => Value::Object(
      map
        .iter()
        .map(|(k, v)| (k.clone(), resolve_value(v, vars)))
        .collect(),
    ),
    other => other.clone(),
  }
}

/// Paths referenced by placeholders in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<String> {
  PLACEHOLDER
    .captures_iter(text)
    .map(|caps| caps[1].to_string())
    .collect()
}
