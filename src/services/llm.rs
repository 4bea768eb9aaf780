//! Chat-completion transport layer.
//!
//! A thin client for OpenAI-compatible `/chat/completions` endpoints plus
//! the `CompletionBackend` seam that lets tests substitute a deterministic
//! mock for the hosted model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

use crate::config::Config;

/// Errors that can occur while talking to the completion service.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure before a response was received.
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service answered with a non-success HTTP status.
    #[error("Upstream error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    /// The response body did not match the chat-completion shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One `{role, content}` entry in a chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Something that can turn a chat exchange into one completion.
///
/// The production implementation is [`ChatCompletionsClient`]; tests use
/// [`MockBackend`]. No retries are performed at this seam — a failed call
/// surfaces once and the caller decides how to degrade.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for a hosted OpenAI-compatible chat-completion endpoint.
///
/// Built once at startup and shared read-only across requests; the inner
/// `reqwest::Client` already pools connections, so concurrent reads need no
/// further synchronization.
pub struct ChatCompletionsClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.llm_base_url, &config.llm_api_key, &config.llm_model)
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
    }
}

/// Deterministic completion backend for tests.
///
/// Returns a fixed completion (or a fixed error) without any network call
/// and records every exchange it receives, so tests can assert both the
/// number of upstream calls and the exact prompt that was sent.
pub struct MockBackend {
    response: Result<String, String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockBackend {
    /// Backend that answers every exchange with the same completion text.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose every call fails with a communication error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The messages of the most recent call, if any.
    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(LlmError::Communication(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_backend_returns_fixed_response() {
        let backend = MockBackend::new("fixed completion");
        let result = backend.complete(&[ChatMessage::user("prompt")]).await;
        assert_eq!(result.unwrap(), "fixed completion");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn mock_backend_records_messages() {
        let backend = MockBackend::new("ok");
        let messages = vec![ChatMessage::system("instruction"), ChatMessage::user("doc")];
        backend.complete(&messages).await.unwrap();
        assert_eq!(backend.last_messages().unwrap(), messages);
    }

    #[tokio::test]
    async fn mock_backend_failure_mode() {
        let backend = MockBackend::failing("connection refused");
        let result = backend.complete(&[ChatMessage::user("prompt")]).await;
        match result {
            Err(LlmError::Communication(message)) => {
                assert!(message.contains("connection refused"))
            }
            other => panic!("Expected Communication error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn client_rejects_unreachable_endpoint() {
        let client = ChatCompletionsClient::new("http://127.0.0.1:1", "key", "solar-pro");
        let result = client.complete(&[ChatMessage::user("test")]).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[test]
    fn chat_message_roles() {
        assert_eq!(ChatMessage::system("a").role, "system");
        assert_eq!(ChatMessage::user("b").role, "user");
    }
}
