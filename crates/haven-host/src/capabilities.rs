//! Collaborator traits and the bundle handed to the runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HostError;
use crate::types::{Alert, CompletionRequest, CompletionResponse, Notification, PersistenceWrite};

/// AI completion collaborator.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
  /// Run one completion. Any non-success outcome is an `Err`.
  async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, HostError>;
}

/// Persistence collaborator used by `save_to_db` actions.
#[async_trait]
pub trait Persistence: Send + Sync {
  /// Upsert `data` into `table`. Returns whether the write succeeded.
  async fn upsert(&self, write: PersistenceWrite) -> Result<bool, HostError>;
}

/// Notification collaborator used by `send_notification` actions.
#[async_trait]
pub trait NotificationSink: Send + Sync {
  async fn send(&self, notification: Notification) -> Result<bool, HostError>;
}

/// Alerting collaborator used by `create_alert` actions.
#[async_trait]
pub trait AlertSink: Send + Sync {
  async fn create(&self, alert: Alert) -> Result<bool, HostError>;
}

/// Everything a run may call out to.
#[derive(Clone)]
pub struct Capabilities {
  pub completion: Arc<dyn CompletionProvider>,
  pub persistence: Arc<dyn Persistence>,
  pub notifications: Arc<dyn NotificationSink>,
  pub alerts: Arc<dyn AlertSink>,
}

impl Capabilities {
  /// Use one value for persistence, notifications and alerts.
  pub fn with_sinks<S>(completion: Arc<dyn CompletionProvider>, sinks: Arc<S>) -> Self
  where
    S: Persistence + NotificationSink + AlertSink + 'static,
  {
    Self {
      completion,
      persistence: sinks.clone(),
      notifications: sinks.clone(),
      alerts: sinks,
    }
  }
}

/// Routes completion requests to a provider by `request.provider`.
#[derive(Default, Clone)]
pub struct CompletionRouter {
  providers: HashMap<String, Arc<dyn CompletionProvider>>,
  fallback: Option<Arc<dyn CompletionProvider>>,
}

impl CompletionRouter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a provider under a name.
  pub fn with_provider(
    mut self,
    name: impl Into<String>,
    provider: Arc<dyn CompletionProvider>,
  ) -> Self {
    self.providers.insert(name.into(), provider);
    self
  }

  /// Provider used for names that are not registered.
  pub fn with_fallback(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
    self.fallback = Some(provider);
    self
  }
}

#[async_trait]
impl CompletionProvider for CompletionRouter {
  async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, HostError> {
    let provider = self
      .providers
      .get(&request.provider)
      .or(self.fallback.as_ref())
      .ok_or_else(|| HostError::UnknownProvider(request.provider.clone()))?;
    provider.complete(request).await
  }
}
