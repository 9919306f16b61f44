//! Flow runner with channel-based triggering.
//!
//! The `FlowRunner` owns an mpsc channel for receiving trigger payloads and
//! starts one run per payload using the shared [`Runtime`].

use std::sync::Arc;

use haven_flow::Flow;
use haven_runtime::{ExecutionContext, ExecutionStatus, Runtime, Variables};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::EngineError;

/// Executes a flow in response to trigger payloads.
///
/// Runs started by the loop execute concurrently; each owns its own
/// execution context.
///
/// # Usage
///
/// ```ignore
/// let runner = FlowRunner::new(runtime, flow)?;
///
/// // Hand the sender to webhooks, schedulers, the UI...
/// let sender = runner.sender();
///
/// let cancel = CancellationToken::new();
/// runner.start(cancel).await?;
/// ```
pub struct FlowRunner {
  sender: mpsc::Sender<serde_json::Value>,
  receiver: mpsc::Receiver<serde_json::Value>,
  runtime: Arc<Runtime>,
  flow: Arc<Flow>,
  results: Option<mpsc::UnboundedSender<ExecutionContext>>,
}

impl FlowRunner {
  /// Create a runner for `flow`. Fails if the flow is inactive.
  pub fn new(runtime: Arc<Runtime>, flow: Arc<Flow>) -> Result<Self, EngineError> {
    Self::with_buffer_size(runtime, flow, 100)
  }

  /// Create a runner with a custom trigger buffer size.
  pub fn with_buffer_size(
    runtime: Arc<Runtime>,
    flow: Arc<Flow>,
    buffer_size: usize,
  ) -> Result<Self, EngineError> {
    if !flow.active {
      return Err(EngineError::Inactive {
        flow_id: flow.flow_id.clone(),
      });
    }

    let (sender, receiver) = mpsc::channel(buffer_size);
    Ok(Self {
      sender,
      receiver,
      runtime,
      flow,
      results: None,
    })
  }

  /// Deliver every finished execution context to `results`.
  pub fn with_results(mut self, results: mpsc::UnboundedSender<ExecutionContext>) -> Self {
    self.results = Some(results);
    self
  }

  /// A sender handle for triggering runs.
  pub fn sender(&self) -> mpsc::Sender<serde_json::Value> {
    self.sender.clone()
  }

  /// Trigger a run with the given payload.
  pub async fn run(&self, payload: serde_json::Value) -> Result<(), EngineError> {
    self
      .sender
      .send(payload)
      .await
      .map_err(|_| EngineError::ChannelClosed)
  }

  /// Start the execution loop.
  ///
  /// Returns when the cancellation token fires or every sender has been
  /// dropped. Runs still in flight are awaited before returning; on
  /// cancellation they observe their child token and stop at the next node
  /// boundary.
  pub async fn start(mut self, cancel: CancellationToken) -> Result<(), EngineError> {
    info!(
      flow_id = %self.flow.flow_id,
      flow_name = %self.flow.name,
      "starting flow runner"
    );

    // Only external senders keep the loop alive.
    drop(self.sender);

    let mut in_flight = JoinSet::new();
    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!(flow_id = %self.flow.flow_id, "flow runner cancelled");
          break;
        }
        payload = self.receiver.recv() => {
          let Some(payload) = payload else {
            info!(flow_id = %self.flow.flow_id, "flow runner channel closed");
            break;
          };

          let runtime = self.runtime.clone();
          let flow = self.flow.clone();
          let results = self.results.clone();
          let run_cancel = cancel.child_token();
          in_flight.spawn(async move {
            let ctx = runtime
              .execute(&flow, Variables::from_value(payload), run_cancel)
              .await;
            report(&ctx);
            if let Some(results) = results {
              // receiver may have been dropped
              let _ = results.send(ctx);
            }
          });
        }
        Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
          if let Err(e) = joined {
            error!(flow_id = %self.flow.flow_id, error = %e, "flow run task failed");
          }
        }
      }
    }

    while let Some(joined) = in_flight.join_next().await {
      if let Err(e) = joined {
        error!(flow_id = %self.flow.flow_id, error = %e, "flow run task failed");
      }
    }

    Ok(())
  }

  /// Execute one run directly, without the loop.
  pub async fn execute_once(
    &self,
    payload: serde_json::Value,
    cancel: CancellationToken,
  ) -> ExecutionContext {
    self
      .runtime
      .execute(&self.flow, Variables::from_value(payload), cancel)
      .await
  }

  pub fn runtime(&self) -> &Runtime {
    &self.runtime
  }

  pub fn flow(&self) -> &Flow {
    &self.flow
  }
}

fn report(ctx: &ExecutionContext) {
  match ctx.status {
    ExecutionStatus::Completed => info!(
      flow_id = %ctx.flow_id,
      execution_id = %ctx.execution_id,
      nodes = ctx.visited_nodes().len(),
      "flow run completed"
    ),
    ExecutionStatus::Failed => warn!(
      flow_id = %ctx.flow_id,
      execution_id = %ctx.execution_id,
      error = ctx.error.as_deref().unwrap_or_default(),
      "flow run failed"
    ),
    ExecutionStatus::Running => {}
  }
}
