use haven_flow::{Action, ActionConfig, Node};
use haven_host::{Alert, HostError, Notification, PersistenceWrite};
use serde_json::{Value, json};
use tracing::info;

use crate::error::NodeError;
use crate::nodes::{NodeEnv, NodeOutcome};
use crate::template::{resolve, resolve_value};
use crate::variables::Variables;

pub(super) async fn execute(
  node: &Node,
  config: &ActionConfig,
  vars: &mut Variables,
  env: &NodeEnv<'_>,
) -> Result<NodeOutcome, NodeError> {
  let action_type = config.action.action_type();
  let capabilities = env.capabilities;

  let (payload, result) = match &config.action {
    Action::SaveToDb { table, data } => {
      let write = PersistenceWrite {
        table: resolve(table, vars),
        data: data
          .iter()
          .map(|(k, v)| (k.clone(), resolve_value(v, vars)))
          .collect(),
      };
      let payload = to_payload(&write);
      (payload, capabilities.persistence.upsert(write).await)
    }
    Action::SendNotification {
      recipient,
      title,
      message,
      notification_type,
    } => {
      let notification = Notification {
        recipient: resolve(recipient, vars),
        title: resolve(title, vars),
        message: resolve(message, vars),
        notification_type: resolve(notification_type, vars),
      };
      let payload = to_payload(&notification);
      (payload, capabilities.notifications.send(notification).await)
    }
    Action::CreateAlert {
      recipient,
      risk_level,
      risk_type,
      details,
    } => {
      let alert = Alert {
        recipient: resolve(recipient, vars),
        risk_level: resolve(risk_level, vars),
        risk_type: resolve(risk_type, vars),
        details: resolve_value(details, vars),
      };
      let payload = to_payload(&alert);
      (payload, capabilities.alerts.create(alert).await)
    }
    Action::Log { message } => {
      let message = resolve(message, vars);
      info!(
        target: "haven::flow_log",
        execution_id = %env.execution_id,
        flow_id = %env.flow_id,
        node_id = %node.node_id,
        "{}",
        message
      );
      (json!({ "message": message }), Ok::<bool, HostError>(true))
    }
  };

  match result {
    Ok(true) => {}
    Ok(false) => return Err(NodeError::ActionRejected { action_type }),
    Err(source) => {
      return Err(NodeError::Action {
        action_type,
        source,
      });
    }
  }

  let output = json!({
    "actionType": action_type,
    "success": true,
    "payload": payload,
  });
  if let Some(path) = &config.output_variable {
    vars.set(path, output.clone());
  }

  Ok(NodeOutcome::continue_with(Some(payload), output))
}

fn to_payload<T: serde::Serialize>(value: &T) -> Value {
  serde_json::to_value(value).unwrap_or(Value::Null)
}
