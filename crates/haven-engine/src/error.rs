/// Errors from the flow runner.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  /// Inactive flows are not started by the runner.
  #[error("flow '{flow_id}' is not active")]
  Inactive { flow_id: String },

  /// The runner's trigger channel is closed.
  #[error("flow runner channel closed")]
  ChannelClosed,
}
