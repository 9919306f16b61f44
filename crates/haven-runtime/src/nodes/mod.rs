//! Per-kind node semantics.
//!
//! Each submodule implements one node kind. They share one contract: read the
//! node's typed config and the current variables, produce an output value,
//! and say where the walk continues.

mod action;
mod ai_call;
mod condition;
mod output;
mod transform;
mod trigger;

use haven_flow::{Node, NodeKind};
use haven_host::Capabilities;
use serde_json::Value;

use crate::config::RuntimeConfig;
use crate::error::NodeError;
use crate::variables::Variables;

pub use condition::evaluate;
pub use transform::apply;

/// Where the walk continues after a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
  /// Every declared successor, in declaration order.
  All,
  /// Exactly one chosen successor.
  Branch(String),
}

/// Result of executing one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutcome {
  /// Resolved input recorded on the `completed` log entry.
  pub input: Option<Value>,
  pub output: Value,
  pub next: Next,
  /// Set by `output` nodes; becomes the run's final output.
  pub final_output: bool,
}

impl NodeOutcome {
  pub(crate) fn continue_with(input: Option<Value>, output: Value) -> Self {
    Self {
      input,
      output,
      next: Next::All,
      final_output: false,
    }
  }
}

/// What a node may use besides its config and the variables.
pub struct NodeEnv<'a> {
  pub capabilities: &'a Capabilities,
  pub config: &'a RuntimeConfig,
  pub execution_id: &'a str,
  pub flow_id: &'a str,
}

/// Execute one node against the run's variables.
pub async fn execute(
  node: &Node,
  vars: &mut Variables,
  env: &NodeEnv<'_>,
) -> Result<NodeOutcome, NodeError> {
  match &node.kind {
    NodeKind::Trigger => Ok(trigger::execute(vars)),
    NodeKind::AiCall(config) => ai_call::execute(node, config, vars, env).await,
    NodeKind::Condition(config) => Ok(condition::execute(config, vars)),
    NodeKind::Transform(config) => transform::execute(config, vars),
    NodeKind::Action(config) => action::execute(node, config, vars, env).await,
    NodeKind::Output(config) => Ok(output::execute(config, vars)),
  }
}
