//! Runtime configuration.

use std::time::Duration;

use haven_flow::Node;
use serde::{Deserialize, Serialize};

/// Configuration for the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
  /// Timeout for a node that does not set `timeoutMs`. `None` waits forever.
  pub default_node_timeout_ms: Option<u64>,
  /// Deadline for a whole run. `None` means no deadline.
  pub run_timeout_ms: Option<u64>,
  /// Maximum node visits per run.
  pub max_steps: usize,
  /// Provider for `ai_call` nodes that do not name one.
  pub default_provider: String,
  /// Model for `ai_call` nodes that do not name one.
  pub default_model: String,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      default_node_timeout_ms: Some(60_000),
      run_timeout_ms: None,
      max_steps: 1_000,
      default_provider: haven_flow::config::DEFAULT_PROVIDER.to_string(),
      default_model: "gpt-4o-mini".to_string(),
    }
  }
}

impl RuntimeConfig {
  /// Timeout for one invocation of `node`.
  pub fn node_timeout(&self, node: &Node) -> Option<Duration> {
    node
      .timeout_ms
      .or(self.default_node_timeout_ms)
      .map(Duration::from_millis)
  }

  pub fn run_timeout(&self) -> Option<Duration> {
    self.run_timeout_ms.map(Duration::from_millis)
  }
}
