use haven_flow::{ConditionConfig, ConditionOperator};
use serde_json::{Value, json};

use crate::nodes::{Next, NodeOutcome};
use crate::template;
use crate::variables::{Variables, display};

pub(super) fn execute(config: &ConditionConfig, vars: &Variables) -> NodeOutcome {
  let result = evaluate(config, vars);
  let target = if result {
    &config.true_node
  } else {
    &config.false_node
  };

  NodeOutcome {
    input: Some(json!({
      "field": config.field,
      "value": vars.get(&config.field),
    })),
    output: json!({ "result": result, "next": target }),
    next: Next::Branch(target.clone()),
    final_output: false,
  }
}

/// Evaluate a condition against the current variables.
///
/// Never fails: a missing field or a value that cannot be compared makes the
/// comparison false (or empty, for the emptiness checks). A field holding
/// `null` counts as missing.
pub fn evaluate(config: &ConditionConfig, vars: &Variables) -> bool {
  let field = vars.get(&config.field).filter(|value| !value.is_null());
  let expected = match &config.value {
    Value::String(text) => Value::String(template::resolve(text, vars)),
    other => other.clone(),
  };

  match config.operator {
    ConditionOperator::Equals => equals(field, &expected),
    ConditionOperator::NotEquals => !equals(field, &expected),
    ConditionOperator::Contains => {
      field.is_some_and(|actual| display(actual).contains(&display(&expected)))
    }
    ConditionOperator::GreaterThan => compare(field, &expected, |a, b| a > b),
    ConditionOperator::LessThan => compare(field, &expected, |a, b| a < b),
    ConditionOperator::IsEmpty => is_empty(field),
    ConditionOperator::IsNotEmpty => !is_empty(field),
  }
}

fn equals(field: Option<&Value>, expected: &Value) -> bool {
  let Some(actual) = field else {
    return false;
  };
  match (as_number(actual), as_number(expected)) {
    (Some(a), Some(b)) => a == b,
    _ => display(actual) == display(expected),
  }
}

fn compare(field: Option<&Value>, expected: &Value, op: fn(f64, f64) -> bool) -> bool {
  match (field.and_then(as_number), as_number(expected)) {
    (Some(a), Some(b)) => op(a, b),
    _ => false,
  }
}

/// Numbers, and strings that parse as a finite number.
fn as_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => {
      let s = s.trim();
      if s.is_empty() {
        return None;
      }
      s.parse::<f64>().ok().filter(|n| n.is_finite())
    }
    _ => None,
  }
}

fn is_empty(field: Option<&Value>) -> bool {
  match field {
    None => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(Value::Array(items)) => items.is_empty(),
    Some(Value::Object(map)) => map.is_empty(),
    Some(_) => false,
  }
}
