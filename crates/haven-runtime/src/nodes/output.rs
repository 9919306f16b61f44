use haven_flow::OutputConfig;
use serde_json::{Value, json};

use crate::nodes::{Next, NodeOutcome};
use crate::variables::Variables;

/// Project the named variable, or the whole store when none is named.
pub(super) fn execute(config: &OutputConfig, vars: &Variables) -> NodeOutcome {
  let (input, output) = match &config.output_variable {
    Some(path) => (
      Some(json!({ "outputVariable": path })),
      vars.get(path).cloned().unwrap_or(Value::Null),
    ),
    None => (None, vars.snapshot()),
  };

  NodeOutcome {
    input,
    output,
    next: Next::All,
    final_output: true,
  }
}
