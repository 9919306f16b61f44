//! Typed node configuration.
//!
//! Each node's free-form config map is parsed into one of these structs when
//! the flow is loaded, so malformed configuration (unknown operator, missing
//! prompt, unknown action type) is a load-time error rather than a mid-run
//! failure. Keys are camelCase, as the flow editor writes them.

use haven_config::ConfigMap;
use serde::{Deserialize, Serialize};

/// Provider used when an `ai_call` node does not name one.
pub const DEFAULT_PROVIDER: &str = "openai";
/// Sampling temperature used when an `ai_call` node does not set one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Completion length used when an `ai_call` node does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Delimiter for `split` / `join` transforms.
pub const DEFAULT_DELIMITER: &str = ",";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCallConfig {
  pub prompt: String,
  #[serde(default)]
  pub provider: Option<String>,
  #[serde(default)]
  pub model: Option<String>,
  #[serde(default = "default_temperature")]
  pub temperature: f64,
  #[serde(default = "default_max_tokens")]
  pub max_tokens: u32,
  #[serde(default)]
  pub output_variable: Option<String>,
}

fn default_temperature() -> f64 {
  DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
  DEFAULT_MAX_TOKENS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
  Equals,
  NotEquals,
  Contains,
  GreaterThan,
  LessThan,
  IsEmpty,
  IsNotEmpty,
}

/// Condition config after both branch targets have been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionConfig {
  pub field: String,
  pub operator: ConditionOperator,
  #[serde(default)]
  pub value: serde_json::Value,
  pub true_node: String,
  pub false_node: String,
}

/// Condition config as authored; branch targets may still be missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawConditionConfig {
  pub field: String,
  pub operator: ConditionOperator,
  #[serde(default)]
  pub value: serde_json::Value,
  #[serde(default)]
  pub true_node: Option<String>,
  #[serde(default)]
  pub false_node: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOperation {
  Uppercase,
  Lowercase,
  Trim,
  Split,
  Join,
  JsonParse,
  JsonStringify,
  Extract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformConfig {
  /// Variable path of the value to transform.
  pub input: String,
  pub operation: TransformOperation,
  /// Variable path the result is written to.
  #[serde(default)]
  pub output: Option<String>,
  #[serde(default = "default_delimiter")]
  pub delimiter: String,
  /// Key read by `extract`.
  #[serde(default)]
  pub key: Option<String>,
}

fn default_delimiter() -> String {
  DEFAULT_DELIMITER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
  #[serde(flatten)]
  pub action: Action,
  #[serde(default)]
  pub output_variable: Option<String>,
}

/// External effect dispatched by an `action` node.
///
/// String fields are templates, resolved right before dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
  tag = "actionType",
  rename_all = "snake_case",
  rename_all_fields = "camelCase"
)]
pub enum Action {
  SaveToDb {
    table: String,
    #[serde(default)]
    data: ConfigMap,
  },
  SendNotification {
    #[serde(alias = "userId")]
    recipient: String,
    title: String,
    message: String,
    #[serde(default = "default_notification_type")]
    notification_type: String,
  },
  CreateAlert {
    #[serde(alias = "userId")]
    recipient: String,
    risk_level: String,
    risk_type: String,
    #[serde(default)]
    details: serde_json::Value,
  },
  Log {
    #[serde(default)]
    message: String,
  },
}

fn default_notification_type() -> String {
  "info".to_string()
}

impl Action {
  pub fn action_type(&self) -> &'static str {
    match self {
      Action::SaveToDb { .. } => "save_to_db",
      Action::SendNotification { .. } => "send_notification",
      Action::CreateAlert { .. } => "create_alert",
      Action::Log { .. } => "log",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
  #[serde(default)]
  pub output_variable: Option<String>,
}
