//! Completion provider for OpenAI-compatible chat completion APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::CompletionProvider;
use crate::error::HostError;
use crate::types::{CompletionRequest, CompletionResponse};

/// Calls `POST {base_url}/v1/chat/completions` with the prompt as a single
/// user message.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
  client: Client,
  base_url: String,
  api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 1],
  temperature: f64,
  max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

impl OpenAiCompatibleProvider {
  pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
    Self {
      client: Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key,
    }
  }

  fn api_url(&self) -> String {
    if self.base_url.ends_with("/chat/completions") {
      self.base_url.clone()
    } else if self.base_url.ends_with("/v1") {
      format!("{}/chat/completions", self.base_url)
    } else {
      format!("{}/v1/chat/completions", self.base_url)
    }
  }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
  async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, HostError> {
    let body = ChatRequest {
      model: &request.model,
      messages: [ChatMessage {
        role: "user",
        content: &request.prompt,
      }],
      temperature: request.temperature,
      max_tokens: request.max_tokens,
    };

    let mut http_request = self.client.post(self.api_url()).json(&body);
    if let Some(key) = &self.api_key {
      http_request = http_request.bearer_auth(key);
    }

    debug!(provider = %request.provider, model = %request.model, "completion_request");

    let response = http_request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      return Err(HostError::Completion {
        provider: request.provider,
        message: format!("{}: {}", status, text),
      });
    }

    let parsed: ChatResponse = response
      .json()
      .await
      .map_err(|e| HostError::InvalidResponse {
        provider: request.provider.clone(),
        message: e.to_string(),
      })?;

    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or_else(|| HostError::InvalidResponse {
        provider: request.provider.clone(),
        message: "response contained no message content".to_string(),
      })?;

    Ok(CompletionResponse { content })
  }
}
