//! Runtime error types.

use haven_host::HostError;

/// Why a single node failed.
///
/// Node errors are recorded on the node's `failed` log entry and abort the
/// run.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
  /// The completion provider failed.
  #[error("ai completion failed: {source}")]
  Completion {
    #[source]
    source: HostError,
  },

  /// An action collaborator returned an error.
  #[error("{action_type} failed: {source}")]
  Action {
    action_type: &'static str,
    #[source]
    source: HostError,
  },

  /// An action collaborator reported an unsuccessful call.
  #[error("{action_type} was rejected by the collaborator")]
  ActionRejected { action_type: &'static str },

  /// A transform input variable is not set.
  #[error("transform input '{path}' is not set")]
  MissingInput { path: String },

  /// A transform operation cannot apply to its input.
  #[error("{operation} cannot apply: {message}")]
  Transform {
    operation: &'static str,
    message: String,
  },

  /// The node did not settle within its timeout.
  #[error("node timed out after {timeout_ms}ms")]
  TimedOut { timeout_ms: u64 },

  /// The run was cancelled while the node was executing.
  #[error("execution cancelled")]
  Cancelled,
}

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  /// A node failed; its own log entry carries the detail.
  #[error("node '{node_id}' failed: {message}")]
  NodeFailed { node_id: String, message: String },

  /// The run was cancelled between nodes.
  #[error("execution cancelled")]
  Cancelled,

  /// The run deadline passed.
  #[error("run exceeded its {timeout_ms}ms deadline")]
  DeadlineExceeded { timeout_ms: u64 },

  /// More node visits than the configured limit.
  #[error("run exceeded the limit of {max_steps} node visits")]
  StepLimit { max_steps: usize },

  /// A node id passed by the caller does not exist in the flow.
  #[error("node '{0}' not found in flow")]
  UnknownNode(String),
}
