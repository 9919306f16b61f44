use serde::{Deserialize, Serialize};

/// Free-form node configuration, shaped by the node type.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// One step of a flow as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: NodeType,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub config: ConfigMap,
  #[serde(default)]
  pub position: Position,
  /// Downstream node ids. Condition nodes route through `trueNode` /
  /// `falseNode` in their config instead.
  #[serde(default, alias = "connections")]
  pub successors: Vec<String>,
  /// Overrides the runtime's default per-node timeout.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
  Trigger,
  AiCall,
  Condition,
  Transform,
  Action,
  Output,
}

impl NodeType {
  pub fn as_str(&self) -> &'static str {
    match self {
      NodeType::Trigger => "trigger",
      NodeType::AiCall => "ai_call",
      NodeType::Condition => "condition",
      NodeType::Transform => "transform",
      NodeType::Action => "action",
      NodeType::Output => "output",
    }
  }
}

/// Editor canvas position. Presentational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}
