use thiserror::Error;

/// Configuration errors detected while loading a flow definition.
///
/// A flow that fails to load never starts a run.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("flow must have exactly one trigger node, found {found}")]
  TriggerCount { found: usize },

  #[error("duplicate node id: {node_id}")]
  DuplicateNodeId { node_id: String },

  #[error("node '{from}' references unknown successor '{to}'")]
  UnknownSuccessor { from: String, to: String },

  #[error("condition node '{node_id}' is missing its '{branch}' target")]
  MissingBranch {
    node_id: String,
    branch: &'static str,
  },

  #[error("invalid config for {node_type} node '{node_id}': {message}")]
  InvalidNodeConfig {
    node_id: String,
    node_type: &'static str,
    message: String,
  },

  #[error("node '{node_id}' is not reachable from the trigger")]
  Unreachable { node_id: String },

  #[error("cycle detected through node '{node_id}'")]
  CycleDetected { node_id: String },
}
