//! Progress events for a flow run.
//!
//! Every log entry the runtime records is mirrored by one event, emitted at
//! the moment the entry is written, plus a `run_started` event before the
//! trigger executes. A caller streaming events sees the same node order and
//! the same node outputs it would later find in
//! [`ExecutionContext::logs`](crate::ExecutionContext).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One transition of a flow run, serialized with an `event` tag such as
/// `"node_completed"`.
///
/// Node events follow the depth-first visiting order. A condition emits
/// `node_completed` before anything on its chosen branch starts, and a
/// run emits at most one `node_failed`, directly before `run_failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
  /// A run was created with a fresh `exec_<millis>_<suffix>` id.
  RunStarted {
    execution_id: String,
    flow_id: String,
  },

  /// A node's `started` log entry was written.
  NodeStarted {
    execution_id: String,
    node_id: String,
  },

  /// A node finished. `output` is the completed log entry's output:
  ///
  /// - `trigger`: the variable store as the run began
  /// - `ai_call`: the completion text
  /// - `condition`: `{result, next}`, with `next` the branch taken
  /// - `transform`: the transformed value
  /// - `action`: `{actionType, success, payload}`
  /// - `output`: the projected run output
  NodeCompleted {
    execution_id: String,
    node_id: String,
    output: serde_json::Value,
  },

  /// A node failed and the run will not visit anything after it.
  NodeFailed {
    execution_id: String,
    node_id: String,
    error: String,
  },

  /// Every reachable node along the taken branches completed.
  RunCompleted { execution_id: String },

  /// The run stopped early. `error` matches the context's `error`: a node
  /// failure, cancellation, the step limit or the run deadline.
  RunFailed { execution_id: String, error: String },
}

/// Receives execution events.
///
/// `notify` is called inline by the runtime and must not block.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }

  /// A notifier together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
