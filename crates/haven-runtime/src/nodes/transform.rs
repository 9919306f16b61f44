use haven_flow::{TransformConfig, TransformOperation};
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::nodes::NodeOutcome;
use crate::variables::{Variables, display};

pub(super) fn execute(
  config: &TransformConfig,
  vars: &mut Variables,
) -> Result<NodeOutcome, NodeError> {
  let input = vars
    .get(&config.input)
    .cloned()
    .ok_or_else(|| NodeError::MissingInput {
      path: config.input.clone(),
    })?;

  let output = apply(config, &input)?;
  if let Some(path) = &config.output {
    vars.set(path, output.clone());
  }

  Ok(NodeOutcome::continue_with(
    Some(json!({ "input": config.input, "value": input })),
    output,
  ))
}

/// Apply a transform operation to a value.
pub fn apply(config: &TransformConfig, input: &Value) -> Result<Value, NodeError> {
  let operation = config.operation;
  match operation {
    TransformOperation::Uppercase => map_text(operation, input, |s| s.to_uppercase()),
    TransformOperation::Lowercase => map_text(operation, input, |s| s.to_lowercase()),
    TransformOperation::Trim => map_text(operation, input, |s| s.trim().to_string()),
    TransformOperation::Split => {
      let text = expect_string(operation, input)?;
      let parts: Vec<Value> = if config.delimiter.is_empty() {
        text.chars().map(|c| Value::String(c.to_string())).collect()
      } else {
        text
          .split(config.delimiter.as_str())
          .map(|part| Value::String(part.to_string()))
          .collect()
      };
      Ok(Value::Array(parts))
    }
    TransformOperation::Join => match input {
      Value::Array(items) => Ok(Value::String(
        items
          .iter()
          .map(display)
          .collect::<Vec<_>>()
          .join(&config.delimiter),
      )),
      other => Err(wrong_type(operation, "an array", other)),
    },
    TransformOperation::JsonParse => {
      let text = expect_string(operation, input)?;
      serde_json::from_str(text).map_err(|e| NodeError::Transform {
        operation: name(operation),
        message: format!("malformed JSON: {}", e),
      })
    }
    TransformOperation::JsonStringify => Ok(Value::String(input.to_string())),
    TransformOperation::Extract => {
      let key = config.key.as_deref().ok_or_else(|| NodeError::Transform {
        operation: name(operation),
        message: "no key configured".to_string(),
      })?;
      if !matches!(input, Value::Object(_) | Value::Array(_)) {
        return Err(wrong_type(operation, "an object", input));
      }
      Ok(extract(input, key).cloned().unwrap_or(Value::Null))
    }
  }
}

fn extract<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
  if let Some(found) = value.as_object().and_then(|map| map.get(key)) {
    return Some(found);
  }

  key.split('.').try_fold(value, |current, segment| match current {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
    _ => None,
  })
}

fn map_text(
  operation: TransformOperation,
  input: &Value,
  f: impl Fn(&str) -> String,
) -> Result<Value, NodeError> {
  match input {
    Value::String(s) => Ok(Value::String(f(s))),
    Value::Number(_) | Value::Bool(_) => Ok(Value::String(f(&display(input)))),
    other => Err(wrong_type(operation, "a string", other)),
  }
}

fn expect_string(operation: TransformOperation, input: &Value) -> Result<&str, NodeError> {
  input
    .as_str()
    .ok_or_else(|| wrong_type(operation, "a string", input))
}

fn wrong_type(operation: TransformOperation, expected: &str, actual: &Value) -> NodeError {
  NodeError::Transform {
    operation: name(operation),
    message: format!("expected {}, got {}", expected, type_name(actual)),
  }
}

fn name(operation: TransformOperation) -> &'static str {
  match operation {
    TransformOperation::Uppercase => "uppercase",
    TransformOperation::Lowercase => "lowercase",
    TransformOperation::Trim => "trim",
    TransformOperation::Split => "split",
    TransformOperation::Join => "join",
    TransformOperation::JsonParse => "json_parse",
    TransformOperation::JsonStringify => "json_stringify",
    TransformOperation::Extract => "extract",
  }
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
