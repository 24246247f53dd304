//! Generation API client (OpenAI-compatible chat completions)

use std::sync::Arc;

use axum::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::{ContentPart, PromptPayload};
use crate::error::AppError;
use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

/// Vision-capable model used for every explanation
pub const MODEL: &str = "gpt-4o";
/// Response length ceiling
pub const MAX_TOKENS: u32 = 300;
pub const TEMPERATURE: f32 = 0.7;

/// A model that turns a prompt into text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the first choice's text, trimmed.
    ///
    /// # Errors
    /// `Upstream` on transport, status or decoding failure;
    /// `EmptyGeneration` when no usable text came back.
    async fn complete(&self, prompt: &PromptPayload) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage<'a> {
    System { content: &'a str },
    User { content: &'a [ContentPart] },
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl<'a> ChatRequest<'a> {
    fn new(prompt: &'a PromptPayload) -> Self {
        Self {
            model: MODEL,
            messages: [
                ChatMessage::System {
                    content: &prompt.system,
                },
                ChatMessage::User {
                    content: &prompt.parts,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl ChatResponse {
    fn first_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }
}

/// HTTP client for the chat completions endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Arc<reqwest::Client>,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(http_client: Arc<reqwest::Client>, base_url: &str, api_key: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, prompt: &PromptPayload) -> Result<String, AppError> {
        let endpoint = format!("{}/chat/completions", self.base_url);
        let timer = UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&["openai"])
            .start_timer();

        let result = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .header("accept", "application/json")
            .json(&ChatRequest::new(prompt))
            .send()
            .await;
        timer.observe_duration();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&["openai", "transport_error"])
                    .inc();
                tracing::warn!(error = %e, "Generation request failed");
                return Err(AppError::Upstream(format!("generation failed: {e}")));
            }
        };

        let status = response.status();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&["openai", status.as_str()])
            .inc();

        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                tracing::error!(%status, "Generation API rejected the configured credential");
            } else {
                tracing::warn!(%status, "Generation API returned an error");
            }
            return Err(AppError::Upstream(format!("generation returned {status}")));
        }

        let payload: ChatResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Undecodable generation response");
            AppError::Upstream(format!("generation decode failed: {e}"))
        })?;

        payload.first_text().ok_or(AppError::EmptyGeneration)
    }
}
