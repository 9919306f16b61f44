//! Execution context and log types.

use chrono::{DateTime, Utc};
use haven_flow::Node;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::variables::Variables;

/// Node id used for log entries written by the runtime itself.
pub const ENGINE_NODE_ID: &str = "engine";

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Running,
  Completed,
  Failed,
}

/// Status recorded by a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
  Started,
  Completed,
  Failed,
}

/// One step of a node's lifecycle within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
  pub node_id: String,
  pub node_name: String,
  pub timestamp: DateTime<Utc>,
  pub status: LogStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub input: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<u64>,
}

impl LogEntry {
  pub fn started(node: &Node) -> Self {
    Self::new(node, LogStatus::Started)
  }

  pub fn completed(
    node: &Node,
    input: Option<serde_json::Value>,
    output: serde_json::Value,
    duration_ms: u64,
  ) -> Self {
    Self {
      input,
      output: Some(output),
      duration_ms: Some(duration_ms),
      ..Self::new(node, LogStatus::Completed)
    }
  }

  pub fn failed(node: &Node, error: String, duration_ms: u64) -> Self {
    Self {
      error: Some(error),
      duration_ms: Some(duration_ms),
      ..Self::new(node, LogStatus::Failed)
    }
  }

  /// A failure recorded by the runtime rather than by a node.
  pub fn engine_failure(error: String) -> Self {
    Self {
      node_id: ENGINE_NODE_ID.to_string(),
      node_name: "Flow engine".to_string(),
      timestamp: Utc::now(),
      status: LogStatus::Failed,
      input: None,
      output: None,
      error: Some(error),
      duration_ms: None,
    }
  }

  fn new(node: &Node, status: LogStatus) -> Self {
    Self {
      node_id: node.node_id.clone(),
      node_name: node.display_name().to_string(),
      timestamp: Utc::now(),
      status,
      input: None,
      output: None,
      error: None,
      duration_ms: None,
    }
  }

  pub fn is_terminal(&self) -> bool {
    self.status != LogStatus::Started
  }
}

/// The complete state of one flow run.
///
/// Owned by the runtime while the run executes and handed to the caller
/// afterwards. Nothing here is persisted by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
  pub execution_id: String,
  pub flow_id: String,
  pub started_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub finished_at: Option<DateTime<Utc>>,
  pub status: ExecutionStatus,
  pub variables: Variables,
  pub logs: Vec<LogEntry>,
  /// Value produced by the last `output` node reached.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl ExecutionContext {
  pub fn new(flow_id: impl Into<String>, variables: Variables) -> Self {
    let started_at = Utc::now();
    Self {
      execution_id: new_execution_id(&started_at),
      flow_id: flow_id.into(),
      started_at,
      finished_at: None,
      status: ExecutionStatus::Running,
      variables,
      logs: Vec::new(),
      output: None,
      error: None,
    }
  }

  /// Append a log entry. Entries are never modified once recorded.
  pub fn record(&mut self, entry: LogEntry) {
    self.logs.push(entry);
  }

  pub fn complete(&mut self) {
    self.status = ExecutionStatus::Completed;
    self.finished_at = Some(Utc::now());
  }

  /// Mark the run failed.
  ///
  /// Adds an engine-level entry unless the last entry already records the
  /// failure.
  pub fn fail(&mut self, error: &RuntimeError) {
    let message = error.to_string();
    let already_logged = self
      .logs
      .last()
      .is_some_and(|entry| entry.status == LogStatus::Failed);
    if !already_logged {
      self.record(LogEntry::engine_failure(message.clone()));
    }
    self.status = ExecutionStatus::Failed;
    self.error = Some(message);
    self.finished_at = Some(Utc::now());
  }

  pub fn is_finished(&self) -> bool {
    self.status != ExecutionStatus::Running
  }

  /// Ids of visited nodes, in visit order. A node visited twice appears
  /// twice.
  pub fn visited_nodes(&self) -> Vec<&str> {
    self
      .logs
      .iter()
      .filter(|entry| entry.status == LogStatus::Started)
      .map(|entry| entry.node_id.as_str())
      .collect()
  }

  /// All entries recorded for one node.
  pub fn entries_for(&self, node_id: &str) -> Vec<&LogEntry> {
    self
      .logs
      .iter()
      .filter(|entry| entry.node_id == node_id)
      .collect()
  }

  /// Terminal entry of the most recent visit to `node_id`.
  pub fn result_of(&self, node_id: &str) -> Option<&LogEntry> {
    self
      .logs
      .iter()
      .rev()
      .find(|entry| entry.node_id == node_id && entry.is_terminal())
  }
}

/// `exec_<unix millis>_<random suffix>`
fn new_execution_id(started_at: &DateTime<Utc>) -> String {
  let suffix = uuid::Uuid::new_v4().simple().to_string();
  format!("exec_{}_{}", started_at.timestamp_millis(), &suffix[..9])
}
