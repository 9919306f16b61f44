use haven_flow::{AiCallConfig, Node};
use haven_host::CompletionRequest;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::NodeError;
use crate::nodes::{NodeEnv, NodeOutcome};
use crate::template;
use crate::variables::Variables;

pub(super) async fn execute(
  node: &Node,
  config: &AiCallConfig,
  vars: &mut Variables,
  env: &NodeEnv<'_>,
) -> Result<NodeOutcome, NodeError> {
  let prompt = template::resolve(&config.prompt, vars);
  let unresolved = template::placeholders(&prompt);
  if !unresolved.is_empty() {
    warn!(
      execution_id = %env.execution_id,
      node_id = %node.node_id,
      unresolved = ?unresolved,
      "prompt has unresolved placeholders"
    );
  }

  let request = CompletionRequest {
    provider: config
      .provider
      .clone()
      .unwrap_or_else(|| env.config.default_provider.clone()),
    model: config
      .model
      .clone()
      .unwrap_or_else(|| env.config.default_model.clone()),
    prompt,
    temperature: config.temperature,
    max_tokens: config.max_tokens,
  };
  let input = json!({
    "provider": request.provider,
    "model": request.model,
    "prompt": request.prompt,
  });

  debug!(
    execution_id = %env.execution_id,
    node_id = %node.node_id,
    provider = %request.provider,
    model = %request.model,
    "requesting completion"
  );

  let response = env
    .capabilities
    .completion
    .complete(request)
    .await
    .map_err(|source| NodeError::Completion { source })?;

  let output = Value::String(response.content);
  if let Some(path) = &config.output_variable {
    vars.set(path, output.clone());
  }

  Ok(NodeOutcome::continue_with(Some(input), output))
}
