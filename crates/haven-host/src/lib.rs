//! Haven Host
//!
//! Contracts for everything a flow run calls out to: the AI completion
//! provider, the persistence layer behind `save_to_db`, and the notification
//! and alerting subsystems. The runtime only sees the traits in
//! [`Capabilities`]; concrete transports live behind them.
//!
//! Included implementations:
//! - [`OpenAiCompatibleProvider`] for chat-completion style HTTP APIs
//! - [`CompletionRouter`] to pick a provider by name
//! - [`StaticCompletion`], [`ScriptedCompletion`] and [`RecordingHost`] for
//!   tests and local runs

mod capabilities;
mod error;
mod http;
mod memory;
mod types;

pub use capabilities::{
  AlertSink, Capabilities, CompletionProvider, CompletionRouter, NotificationSink, Persistence,
};
pub use error::HostError;
pub use http::OpenAiCompatibleProvider;
pub use memory::{RecordingHost, ScriptedCompletion, StaticCompletion};
pub use types::{Alert, CompletionRequest, CompletionResponse, Notification, PersistenceWrite};
