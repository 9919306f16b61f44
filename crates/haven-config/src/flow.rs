use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::node::NodeDef;
use crate::trigger::TriggerDef;

/// A flow definition as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDef {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub trigger: TriggerDef,
  pub nodes: Vec<NodeDef>,
  #[serde(default = "default_active", alias = "isActive")]
  pub active: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
  true
}

impl FlowDef {
  /// Parse a flow definition from its JSON form.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// Get a node definition by id.
  pub fn get_node(&self, node_id: &str) -> Option<&NodeDef> {
    self.nodes.iter().find(|n| n.id == node_id)
  }
}
