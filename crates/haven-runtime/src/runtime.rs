//! Flow runtime.
//!
//! The [`Runtime`] walks a loaded [`Flow`] from its trigger, executing one
//! node at a time and recording a started and a terminal log entry for each
//! node visited. The first node failure aborts the run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use haven_config::FlowDef;
use haven_flow::{Flow, FlowError, LoadOptions, Node};
use haven_host::Capabilities;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RuntimeConfig;
use crate::context::{ExecutionContext, LogEntry};
use crate::error::{NodeError, RuntimeError};
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::nodes::{self, Next, NodeEnv, NodeOutcome};
use crate::variables::Variables;

/// The flow runtime.
///
/// Holds the collaborators and configuration shared by every run. A single
/// runtime can execute many runs concurrently; each run owns its own
/// [`ExecutionContext`].
pub struct Runtime {
  capabilities: Capabilities,
  config: RuntimeConfig,
  notifier: Arc<dyn ExecutionNotifier>,
}

impl Runtime {
  pub fn new(capabilities: Capabilities, config: RuntimeConfig) -> Self {
    Self {
      capabilities,
      config,
      notifier: Arc::new(NoopNotifier),
    }
  }

  /// Send execution events to `notifier`.
  pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// Run `flow` from its trigger with the given initial variables.
  ///
  /// Never returns an error: failures are reported through the returned
  /// context's `status`, `error` and logs.
  #[instrument(
    name = "runtime_execute",
    skip(self, flow, variables, cancel),
    fields(flow_id = %flow.flow_id)
  )]
  pub async fn execute(
    &self,
    flow: &Flow,
    variables: Variables,
    cancel: CancellationToken,
  ) -> ExecutionContext {
    let mut ctx = ExecutionContext::new(&flow.flow_id, variables);

    if !flow.active {
      debug!(execution_id = %ctx.execution_id, "executing inactive flow");
    }
    info!(
      execution_id = %ctx.execution_id,
      variables = ctx.variables.len(),
      "run_started"
    );
    self.notifier.notify(ExecutionEvent::RunStarted {
      execution_id: ctx.execution_id.clone(),
      flow_id: ctx.flow_id.clone(),
    });

    let result = self.walk(flow, &mut ctx, &cancel).await;
    self.finish(&mut ctx, result);
    ctx
  }

  /// Load and validate a definition, then run it.
  ///
  /// A definition that fails validation never starts a run.
  pub async fn execute_definition(
    &self,
    def: FlowDef,
    options: LoadOptions,
    variables: Variables,
    cancel: CancellationToken,
  ) -> Result<ExecutionContext, FlowError> {
    let flow = Flow::load_with(def, options)?;
    Ok(self.execute(&flow, variables, cancel).await)
  }

  /// Execute a single node in isolation.
  ///
  /// For debugging: the node runs against `variables` without walking the
  /// graph, and its successors are not visited.
  #[instrument(
    name = "runtime_execute_node",
    skip(self, flow, variables, cancel),
    fields(flow_id = %flow.flow_id, node_id = %node_id)
  )]
  pub async fn execute_node(
    &self,
    flow: &Flow,
    node_id: &str,
    variables: Variables,
    cancel: CancellationToken,
  ) -> Result<ExecutionContext, RuntimeError> {
    let node = flow
      .get_node(node_id)
      .ok_or_else(|| RuntimeError::UnknownNode(node_id.to_string()))?;

    let mut ctx = ExecutionContext::new(&flow.flow_id, variables);
    let deadline = self.config.run_timeout().map(|limit| Instant::now() + limit);
    let result = self
      .run_node(node, &mut ctx, &cancel, deadline)
      .await
      .map(|_| ());
    self.finish(&mut ctx, result);
    Ok(ctx)
  }

  /// Walk the graph depth-first from the trigger.
  ///
  /// Successors are pushed in reverse so they pop in declaration order,
  /// which visits nodes in the same order as recursive descent.
  async fn walk(
    &self,
    flow: &Flow,
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
  ) -> Result<(), RuntimeError> {
    let deadline = self.config.run_timeout().map(|limit| Instant::now() + limit);
    let mut stack = vec![flow.trigger_id().to_string()];
    let mut steps = 0usize;

    while let Some(node_id) = stack.pop() {
      let Some(node) = flow.get_node(&node_id) else {
        warn!(
          execution_id = %ctx.execution_id,
          node_id = %node_id,
          "successor not found in flow, ending branch"
        );
        continue;
      };

      if cancel.is_cancelled() {
        warn!(execution_id = %ctx.execution_id, "run cancelled");
        return Err(RuntimeError::Cancelled);
      }
      if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        return Err(RuntimeError::DeadlineExceeded {
          timeout_ms: self.config.run_timeout_ms.unwrap_or_default(),
        });
      }
      steps += 1;
      if steps > self.config.max_steps {
        return Err(RuntimeError::StepLimit {
          max_steps: self.config.max_steps,
        });
      }

      let outcome = self.run_node(node, ctx, cancel, deadline).await?;
      match outcome.next {
        Next::All => stack.extend(node.successors.iter().rev().cloned()),
        Next::Branch(target) => stack.push(target),
      }
    }

    Ok(())
  }

  /// Execute one node, recording its log entries.
  #[instrument(name = "node_execute", skip_all, fields(node_id = %node.node_id))]
  async fn run_node(
    &self,
    node: &Node,
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
  ) -> Result<NodeOutcome, RuntimeError> {
    let execution_id = ctx.execution_id.clone();
    let flow_id = ctx.flow_id.clone();

    ctx.record(LogEntry::started(node));
    self.notifier.notify(ExecutionEvent::NodeStarted {
      execution_id: execution_id.clone(),
      node_id: node.node_id.clone(),
    });
    debug!(
      execution_id = %execution_id,
      node_id = %node.node_id,
      node_type = %node.kind.node_type().as_str(),
      "node_started"
    );

    let env = NodeEnv {
      capabilities: &self.capabilities,
      config: &self.config,
      execution_id: &execution_id,
      flow_id: &flow_id,
    };
    let timeout = self.effective_timeout(node, deadline);
    let started = Instant::now();

    let result = tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(NodeError::Cancelled),
      result = with_timeout(nodes::execute(node, &mut ctx.variables, &env), timeout) => result,
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
      Ok(outcome) => {
        ctx.record(LogEntry::completed(
          node,
          outcome.input.clone(),
          outcome.output.clone(),
          duration_ms,
        ));
        if outcome.final_output {
          ctx.output = Some(outcome.output.clone());
        }
        info!(
          execution_id = %execution_id,
          node_id = %node.node_id,
          duration_ms,
          "node_completed"
        );
        self.notifier.notify(ExecutionEvent::NodeCompleted {
          execution_id,
          node_id: node.node_id.clone(),
          output: outcome.output.clone(),
        });
        Ok(outcome)
      }
      Err(e) => {
        let message = e.to_string();
        ctx.record(LogEntry::failed(node, message.clone(), duration_ms));
        error!(
          execution_id = %execution_id,
          node_id = %node.node_id,
          error = %message,
          "node_failed"
        );
        self.notifier.notify(ExecutionEvent::NodeFailed {
          execution_id,
          node_id: node.node_id.clone(),
          error: message.clone(),
        });
        Err(match e {
          NodeError::Cancelled => RuntimeError::Cancelled,
          _ => RuntimeError::NodeFailed {
            node_id: node.node_id.clone(),
            message,
          },
        })
      }
    }
  }

  /// The node's own timeout, capped by what is left of the run deadline.
  fn effective_timeout(&self, node: &Node, deadline: Option<Instant>) -> Option<Duration> {
    let remaining = deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()));
    match (self.config.node_timeout(node), remaining) {
      (Some(node_limit), Some(remaining)) => Some(node_limit.min(remaining)),
      (limit, None) => limit,
      (None, remaining) => remaining,
    }
  }

  fn finish(&self, ctx: &mut ExecutionContext, result: Result<(), RuntimeError>) {
    match result {
      Ok(()) => {
        ctx.complete();
        info!(
          execution_id = %ctx.execution_id,
          nodes = ctx.visited_nodes().len(),
          "run_completed"
        );
        self.notifier.notify(ExecutionEvent::RunCompleted {
          execution_id: ctx.execution_id.clone(),
        });
      }
      Err(e) => {
        error!(execution_id = %ctx.execution_id, error = %e, "run_failed");
        ctx.fail(&e);
        self.notifier.notify(ExecutionEvent::RunFailed {
          execution_id: ctx.execution_id.clone(),
          error: e.to_string(),
        });
      }
    }
  }
}

async fn with_timeout<F>(future: F, timeout: Option<Duration>) -> Result<NodeOutcome, NodeError>
where
  F: Future<Output = Result<NodeOutcome, NodeError>>,
{
  match timeout {
    Some(limit) => tokio::time::timeout(limit, future)
      .await
      .unwrap_or(Err(NodeError::TimedOut {
        timeout_ms: limit.as_millis() as u64,
      })),
    None => future.await,
  }
}
