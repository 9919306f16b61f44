//! The per-run variable store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mutable bag of JSON values addressed by dotted paths.
///
/// `get("analysis.riskLevel")` descends through nested objects (and array
/// indices, for numeric segments). A path that does not resolve is `None`,
/// never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(Map<String, Value>);

impl Variables {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a store from a trigger payload.
  ///
  /// An object becomes the top-level variables; any other value is stored
  /// under `input`.
  pub fn from_value(value: Value) -> Self {
    match value {
      Value::Object(map) => Self(map),
      Value::Null => Self::default(),
      other => {
        let mut map = Map::new();
        map.insert("input".to_string(), other);
        Self(map)
      }
    }
  }

  /// Look up a dotted path.
  pub fn get(&self, path: &str) -> Option<&Value> {
    let path = path.trim();
    if path.is_empty() {
      return None;
    }

    // A literal key wins over descent, so flat keys containing dots still resolve.
    if let Some(value) = self.0.get(path) {
      return Some(value);
    }

    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = self.0.get(first)?;
    for segment in segments {
      current = match current {
        Value::Object(map) => map.get(segment)?,
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
        _ => return None,
      };
    }
    Some(current)
  }

  pub fn contains(&self, path: &str) -> bool {
    self.get(path).is_some()
  }

  /// Write a value at a dotted path, creating intermediate objects.
  ///
  /// Intermediate values that are not objects are replaced.
  pub fn set(&mut self, path: &str, value: Value) {
    let path = path.trim();
    if path.is_empty() {
      return;
    }
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
      return;
    };

    let mut current = &mut self.0;
    for segment in segments {
      let slot = current
        .entry(segment.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
      if !slot.is_object() {
        *slot = Value::Object(Map::new());
      }
      current = match slot {
        Value::Object(map) => map,
        _ => return,
      };
    }
    current.insert(last.to_string(), value);
  }

  /// The whole store as one JSON object.
  pub fn snapshot(&self) -> Value {
    Value::Object(self.0.clone())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// The string form of a value, as substituted into templates.
///
/// Strings are used as-is, `null` becomes the empty string, and arrays and
/// objects are rendered as compact JSON.
pub fn display(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    Value::Array(_) | Value::Object(_) => value.to_string(),
  }
}
