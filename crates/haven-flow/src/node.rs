use haven_config::{NodeType, Position};
use serde::{Deserialize, Serialize};

use crate::config::{ActionConfig, AiCallConfig, ConditionConfig, OutputConfig, TransformConfig};

/// A loaded node: its configuration has been parsed into the typed form for
/// its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub node_id: String,
  pub name: String,
  pub kind: NodeKind,
  pub position: Position,
  /// Declared successors, in declaration order. Not walked for conditions.
  pub successors: Vec<String>,
  pub timeout_ms: Option<u64>,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum NodeKind {
  Trigger,
  AiCall(AiCallConfig),
  Condition(ConditionConfig),
  Transform(TransformConfig),
  Action(ActionConfig),
  Output(OutputConfig),
}

impl NodeKind {
  pub fn node_type(&self) -> NodeType {
    match self {
      NodeKind::Trigger => NodeType::Trigger,
      NodeKind::AiCall(_) => NodeType::AiCall,
      NodeKind::Condition(_) => NodeType::Condition,
      NodeKind::Transform(_) => NodeType::Transform,
      NodeKind::Action(_) => NodeType::Action,
      NodeKind::Output(_) => NodeType::Output,
    }
  }
}

impl Node {
  /// Display name, falling back to the id for unnamed nodes.
  pub fn display_name(&self) -> &str {
    if self.name.is_empty() {
      &self.node_id
    } else {
      &self.name
    }
  }

  /// Nodes this node can continue to.
  ///
  /// For a condition these are its two branch targets; for everything else
  /// the declared successors.
  pub fn logical_successors(&self) -> Vec<&str> {
    match &self.kind {
      NodeKind::Condition(config) => vec![config.true_node.as_str(), config.false_node.as_str()],
      _ => self.successors.iter().map(String::as_str).collect(),
    }
  }
}
