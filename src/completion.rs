//! Chat-completion client abstraction and implementations.
//!
//! Defines the [`CompletionClient`] trait and concrete implementations:
//! - **[`DisabledCompletion`]**: always fails; used when `completion.provider = "disabled"`.
//! - **[`OpenAICompletion`]**: calls an OpenAI-compatible `POST /chat/completions` endpoint.
//!
//! # Error Classes
//!
//! [`CompletionError::Provider`] is reserved for failures the provider itself
//! reported (non-2xx status, or an `error` object in the body). Transport
//! failures, timeouts, and malformed bodies are kept separate so callers can
//! label them differently.
//!
//! No call is retried. Each request carries the timeout configured in
//! `completion.timeout_secs`.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use tertulia_core::models::ChatMessage;

use crate::config::CompletionConfig;

/// Why a completion call failed.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The provider answered and reported an error.
    #[error("API error {status}: {message}")]
    Provider { status: u16, message: String },
    /// The request never produced a usable response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider answered 2xx with a body we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("completion provider is disabled")]
    Disabled,
}

impl CompletionError {
    pub fn is_provider(&self) -> bool {
        matches!(self, CompletionError::Provider { .. })
    }
}

/// A text-completion service accepting a role-tagged message sequence.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// Issue one completion call and return the generated text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

/// Build the completion client selected by `config.provider`.
pub fn create_completion_client(config: &CompletionConfig) -> Result<Arc<dyn CompletionClient>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledCompletion)),
        "openai" => Ok(Arc::new(OpenAICompletion::new(config)?)),
        other => bail!("Unknown completion provider: {}", other),
    }
}

// ============ Disabled ============

pub struct DisabledCompletion;

#[async_trait]
impl CompletionClient for DisabledCompletion {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, CompletionError> {
        Err(CompletionError::Disabled)
    }
}

// ============ OpenAI ============

/// Completion client for OpenAI-compatible chat APIs.
pub struct OpenAICompletion {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAICompletion {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key can be resolved or the HTTP client
    /// cannot be built.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(t) = self.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(m) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(m);
        }
        body
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletion {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(messages))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Provider {
                status: status.as_u16(),
                message: provider_message(&body_text),
            });
        }

        let json: Value = serde_json::from_str(&body_text)
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;
        parse_chat_response(status.as_u16(), &json)
    }
}

/// Extract `error.message` from a provider error body, falling back to the raw text.
fn provider_message(body_text: &str) -> String {
    serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.to_string())
}

/// Parse a chat-completions response body into the first choice's text.
fn parse_chat_response(status: u16, json: &Value) -> Result<String, CompletionError> {
    if let Some(err) = json.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown provider error")
            .to_string();
        return Err(CompletionError::Provider { status, message });
    }

    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CompletionError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_choice() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "¡Qué buena noticia!"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        assert_eq!(parse_chat_response(200, &json).unwrap(), "¡Qué buena noticia!");
    }

    #[test]
    fn test_parse_error_object_is_provider_error() {
        let json = serde_json::json!({"error": {"message": "model overloaded"}});
        let err = parse_chat_response(200, &json).unwrap_err();
        assert!(err.is_provider());
        assert_eq!(err.to_string(), "API error 200: model overloaded");
    }

    #[test]
    fn test_parse_missing_content_is_not_provider_error() {
        let json = serde_json::json!({"choices": []});
        let err = parse_chat_response(200, &json).unwrap_err();
        assert!(!err.is_provider());
        assert!(matches!(err, CompletionError::InvalidResponse(_)));
    }

    #[test]
    fn test_provider_message_prefers_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(provider_message(body), "Incorrect API key provided");
        assert_eq!(provider_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_request_body_includes_optional_settings() {
        let config = CompletionConfig {
            api_key: Some("sk-test".to_string()),
            temperature: Some(0.5),
            max_tokens: Some(120),
            base_url: "https://llm.example.com/v1/".to_string(),
            ..CompletionConfig::default()
        };
        let client = OpenAICompletion::new(&config).unwrap();
        assert_eq!(client.endpoint, "https://llm.example.com/v1/chat/completions");

        let body = client.request_body(&[ChatMessage::system("s"), ChatMessage::user("u")]);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "u");
        assert_eq!(body["max_tokens"], 120);
        assert!(body.get("temperature").is_some());
    }

    #[tokio::test]
    async fn test_disabled_client_fails() {
        let err = DisabledCompletion
            .complete(&[ChatMessage::user("hola")])
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Disabled));
        assert!(!err.is_provider());
    }
}
