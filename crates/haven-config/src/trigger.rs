use serde::{Deserialize, Serialize};

use crate::node::ConfigMap;

/// The event source that starts a flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
  Manual,
  Schedule,
  Event,
  Webhook,
}

/// Trigger descriptor of a flow.
///
/// The engine does not interpret `config`; it belongs to whatever trigger
/// source starts runs (a cron expression, an event name, a webhook path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDef {
  #[serde(rename = "type")]
  pub kind: TriggerKind,
  #[serde(default)]
  pub config: ConfigMap,
}

impl Default for TriggerDef {
  fn default() -> Self {
    Self {
      kind: TriggerKind::Manual,
      config: ConfigMap::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_trigger_kind_snake_case() {
    let def: TriggerDef =
      serde_json::from_value(json!({ "type": "webhook", "config": { "path": "/intake" } })).unwrap();

    assert_eq!(def.kind, TriggerKind::Webhook);
    assert_eq!(def.config["path"], "/intake");
  }

  #[test]
  fn test_trigger_config_defaults_to_empty() {
    let def: TriggerDef = serde_json::from_value(json!({ "type": "schedule" })).unwrap();
    assert_eq!(def.kind, TriggerKind::Schedule);
    assert!(def.config.is_empty());
  }
}
