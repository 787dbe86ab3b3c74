use std::fmt;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppConfig;
use crate::models::conversation::ConversationTurn;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("The provider returned an empty response")]
    EmptyResponseError,
}

/// Sends a conversation to a chat completion provider and returns the
/// assistant's reply. Implementations never touch the session history.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(
        &self,
        history: &[ConversationTurn],
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError>;
}

/// Client for Groq's OpenAI compatible chat completions endpoint.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    api_url: Url,
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    pub fn new(config: &AppConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CompletionError::ProviderError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(GroqClient {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn generate(
        &self,
        history: &[ConversationTurn],
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: model_id,
            messages: history,
            temperature,
            max_tokens,
        };

        debug!("Sending {} turns to {} with model {}", history.len(), self.api_url, model_id);
        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("Failed to reach the provider", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Provider returned {}: {}", status, body);
            return Err(CompletionError::ProviderError(format!(
                "Provider API error ({}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| request_error("Failed to parse provider response", e))?;

        extract_content(chat_response)
    }
}

// The client timeout covers the body read too, so both stages can time out.
fn request_error(context: &str, e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::ProviderError("Request to the provider timed out".to_string())
    } else {
        CompletionError::ProviderError(format!("{}: {}", context, e))
    }
}

fn extract_content(response: ChatResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(CompletionError::EmptyResponseError)
}
