//! Collaborator error types.

/// Errors reported by external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
  /// The completion provider returned a non-success response.
  #[error("completion provider '{provider}' failed: {message}")]
  Completion { provider: String, message: String },

  /// No provider is registered under the requested name.
  #[error("unknown completion provider: {0}")]
  UnknownProvider(String),

  /// The provider's response could not be understood.
  #[error("invalid response from '{provider}': {message}")]
  InvalidResponse { provider: String, message: String },

  /// Transport-level failure talking to a collaborator.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
}
