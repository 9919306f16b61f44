//! In-memory collaborators.
//!
//! Used by tests and by the CLI when no real backend is configured. Every
//! call is recorded so callers can inspect what a run dispatched.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::capabilities::{AlertSink, CompletionProvider, NotificationSink, Persistence};
use crate::error::HostError;
use crate::types::{Alert, CompletionRequest, CompletionResponse, Notification, PersistenceWrite};

/// Answers every prompt with the same text.
#[derive(Debug, Clone)]
pub struct StaticCompletion {
  content: String,
}

impl StaticCompletion {
  pub fn new(content: impl Into<String>) -> Self {
    Self {
      content: content.into(),
    }
  }
}

#[async_trait]
impl CompletionProvider for StaticCompletion {
  async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, HostError> {
    Ok(CompletionResponse {
      content: self.content.clone(),
    })
  }
}

/// Answers known prompts with scripted text and fails on anything else.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
  responses: HashMap<String, String>,
  delay: Option<Duration>,
  requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
  pub fn new() -> Self {
    Self::default()
  }

  /// Respond to `prompt` with `content`.
  pub fn respond(mut self, prompt: impl Into<String>, content: impl Into<String>) -> Self {
    self.responses.insert(prompt.into(), content.into());
    self
  }

  /// Wait this long before answering.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Requests received so far.
  pub async fn requests(&self) -> Vec<CompletionRequest> {
    self.requests.lock().await.clone()
  }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
  async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, HostError> {
    self.requests.lock().await.push(request.clone());

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    match self.responses.get(&request.prompt) {
      Some(content) => Ok(CompletionResponse {
        content: content.clone(),
      }),
      None => Err(HostError::Completion {
        provider: request.provider,
        message: format!("no scripted response for prompt '{}'", request.prompt),
      }),
    }
  }
}

/// Records persistence writes, notifications and alerts.
#[derive(Debug, Default)]
pub struct RecordingHost {
  reject: bool,
  writes: Mutex<Vec<PersistenceWrite>>,
  notifications: Mutex<Vec<Notification>>,
  alerts: Mutex<Vec<Alert>>,
}

impl RecordingHost {
  pub fn new() -> Self {
    Self::default()
  }

  /// A host that records every call but reports each one as unsuccessful.
  pub fn rejecting() -> Self {
    Self {
      reject: true,
      ..Self::default()
    }
  }

  pub async fn writes(&self) -> Vec<PersistenceWrite> {
    self.writes.lock().await.clone()
  }

  pub async fn notifications(&self) -> Vec<Notification> {
    self.notifications.lock().await.clone()
  }

  pub async fn alerts(&self) -> Vec<Alert> {
    self.alerts.lock().await.clone()
  }
}

#[async_trait]
impl Persistence for RecordingHost {
  async fn upsert(&self, write: PersistenceWrite) -> Result<bool, HostError> {
    info!(table = %write.table, "persistence_write");
    self.writes.lock().await.push(write);
    Ok(!self.reject)
  }
}

#[async_trait]
impl NotificationSink for RecordingHost {
  async fn send(&self, notification: Notification) -> Result<bool, HostError> {
    info!(recipient = %notification.recipient, title = %notification.title, "notification_sent");
    self.notifications.lock().await.push(notification);
    Ok(!self.reject)
  }
}

#[async_trait]
impl AlertSink for RecordingHost {
  async fn create(&self, alert: Alert) -> Result<bool, HostError> {
    info!(
      recipient = %alert.recipient,
      risk_level = %alert.risk_level,
      risk_type = %alert.risk_type,
      "alert_created"
    );
    self.alerts.lock().await.push(alert);
    Ok(!self.reject)
  }
}
