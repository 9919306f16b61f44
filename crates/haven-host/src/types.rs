//! Payload contracts exchanged with collaborators.

use serde::{Deserialize, Serialize};

/// A single prompt-in, text-out completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
  pub provider: String,
  pub model: String,
  /// Fully resolved prompt text.
  pub prompt: String,
  pub temperature: f64,
  pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
  pub content: String,
}

/// Upsert-style write to a named table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceWrite {
  pub table: String,
  pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
  pub recipient: String,
  pub title: String,
  pub message: String,
  #[serde(rename = "type")]
  pub notification_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
  pub recipient: String,
  pub risk_level: String,
  pub risk_type: String,
  pub details: serde_json::Value,
}
