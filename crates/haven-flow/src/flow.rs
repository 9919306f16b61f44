use std::collections::HashMap;

use chrono::{DateTime, Utc};
use haven_config::{FlowDef, NodeDef, NodeType, TriggerDef};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{ConditionConfig, RawConditionConfig, TransformOperation};
use crate::error::FlowError;
use crate::graph::Graph;
use crate::node::{Node, NodeKind};

/// How strictly a definition is checked when loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
  /// Accept successor ids that name no node. At runtime such a successor
  /// ends its branch. Unreachable nodes are accepted as well.
  #[serde(default)]
  pub allow_dangling_successors: bool,
  /// Accept cyclic graphs. Runs are then bounded by the runtime step limit.
  #[serde(default)]
  pub allow_cycles: bool,
}

impl LoadOptions {
  /// Options for flows still being wired up in the editor.
  pub fn lenient() -> Self {
    Self {
      allow_dangling_successors: true,
      allow_cycles: true,
    }
  }
}

/// A loaded flow ready for execution.
///
/// Runs only ever borrow a `Flow`, so it cannot change while a run is
/// executing against it. Deserializing reads a [`FlowDef`] and loads it
/// strictly, so a `Flow` always passed validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "FlowDef")]
pub struct Flow {
  pub flow_id: String,
  pub name: String,
  pub description: String,
  pub trigger: TriggerDef,
  pub nodes: Vec<Node>,
  pub active: bool,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  trigger_id: String,
  index: HashMap<String, usize>,
}

impl TryFrom<FlowDef> for Flow {
  type Error = FlowError;

  fn try_from(def: FlowDef) -> Result<Self, Self::Error> {
    Self::load(def)
  }
}

impl Flow {
  /// Validate a definition and load it with strict options.
  pub fn load(def: FlowDef) -> Result<Self, FlowError> {
    Self::load_with(def, LoadOptions::default())
  }

  /// Validate a definition and load it.
  ///
  /// Checks, in order: unique node ids, exactly one trigger, node
  /// configuration, condition branch targets, successor references,
  /// reachability from the trigger and cycles.
  pub fn load_with(def: FlowDef, options: LoadOptions) -> Result<Self, FlowError> {
    let mut index = HashMap::with_capacity(def.nodes.len());
    for (position, node_def) in def.nodes.iter().enumerate() {
      if index.insert(node_def.id.clone(), position).is_some() {
        return Err(FlowError::DuplicateNodeId {
          node_id: node_def.id.clone(),
        });
      }
    }

    let triggers: Vec<&NodeDef> = def
      .nodes
      .iter()
      .filter(|n| n.node_type == NodeType::Trigger)
      .collect();
    if triggers.len() != 1 {
      return Err(FlowError::TriggerCount {
        found: triggers.len(),
      });
    }
    let trigger_id = triggers[0].id.clone();

    let nodes = def
      .nodes
      .into_iter()
      .map(load_node)
      .collect::<Result<Vec<_>, _>>()?;

    for node in &nodes {
      for to in node.logical_successors() {
        if !index.contains_key(to) {
          let must_exist = matches!(node.kind, NodeKind::Condition(_));
          if must_exist || !options.allow_dangling_successors {
            return Err(FlowError::UnknownSuccessor {
              from: node.node_id.clone(),
              to: to.to_string(),
            });
          }
        }
      }
    }

    let graph = Graph::new(&nodes);

    if !options.allow_dangling_successors {
      let reachable = graph.reachable_from(&trigger_id);
      if let Some(orphan) = nodes.iter().find(|n| !reachable.contains(&n.node_id)) {
        return Err(FlowError::Unreachable {
          node_id: orphan.node_id.clone(),
        });
      }
    }

    if !options.allow_cycles {
      if let Some(node_id) = graph.find_cycle() {
        return Err(FlowError::CycleDetected { node_id });
      }
    }

    Ok(Self {
      flow_id: def.id,
      name: def.name,
      description: def.description,
      trigger: def.trigger,
      nodes,
      active: def.active,
      created_at: def.created_at,
      updated_at: def.updated_at,
      trigger_id,
      index,
    })
  }

  /// Get a node by id.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self
      .index
      .get(node_id)
      .and_then(|&position| self.nodes.get(position))
  }

  /// The unique trigger node.
  pub fn trigger_node(&self) -> Option<&Node> {
    self.get_node(&self.trigger_id)
  }

  pub fn trigger_id(&self) -> &str {
    &self.trigger_id
  }
}

fn load_node(def: NodeDef) -> Result<Node, FlowError> {
  let node_type = def.node_type;
  let kind = match node_type {
    NodeType::Trigger => NodeKind::Trigger,
    NodeType::AiCall => NodeKind::AiCall(parse_config(&def)?),
    NodeType::Condition => NodeKind::Condition(load_condition(&def)?),
    NodeType::Transform => {
      let config: crate::config::TransformConfig = parse_config(&def)?;
      if config.operation == TransformOperation::Extract && config.key.is_none() {
        return Err(invalid_config(&def, "extract requires a 'key'".to_string()));
      }
      NodeKind::Transform(config)
    }
    NodeType::Action => NodeKind::Action(parse_config(&def)?),
    NodeType::Output => NodeKind::Output(parse_config(&def)?),
  };

  Ok(Node {
    node_id: def.id,
    name: def.name,
    kind,
    position: def.position,
    successors: def.successors,
    timeout_ms: def.timeout_ms,
  })
}

fn load_condition(def: &NodeDef) -> Result<ConditionConfig, FlowError> {
  let raw: RawConditionConfig = parse_config(def)?;

  let missing = |branch| FlowError::MissingBranch {
    node_id: def.id.clone(),
    branch,
  };
  let true_node = raw
    .true_node
    .filter(|id| !id.is_empty())
    .ok_or_else(|| missing("trueNode"))?;
  let false_node = raw
    .false_node
    .filter(|id| !id.is_empty())
    .ok_or_else(|| missing("falseNode"))?;

  Ok(ConditionConfig {
    field: raw.field,
    operator: raw.operator,
    value: raw.value,
    true_node,
    false_node,
  })
}

fn parse_config<T: DeserializeOwned>(def: &NodeDef) -> Result<T, FlowError> {
  serde_json::from_value(serde_json::Value::Object(def.config.clone()))
    .map_err(|e| invalid_config(def, e.to_string()))
}

fn invalid_config(def: &NodeDef, message: String) -> FlowError {
  FlowError::InvalidNodeConfig {
    node_id: def.id.clone(),
    node_type: def.node_type.as_str(),
    message,
  }
}
