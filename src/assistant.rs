//! Chat relay: forwards a user message to the completion API with a fixed
//! system prompt and returns plain reply text.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::error::{LedgerError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Inbound relay request: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub message: String,
}

/// Relay reply: `{"reply": "..."}` on success, `{"error": "..."}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Reply { reply: String },
    Error { error: String },
}

impl RelayResponse {
    pub fn from_result(result: &Result<String>) -> Self {
        match result {
            Ok(reply) => Self::Reply {
                reply: reply.clone(),
            },
            Err(err) => Self::Error {
                error: err.user_message(),
            },
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Remove markdown emphasis markers; the app renders plain text.
pub fn strip_markup(text: &str) -> String {
    text.replace('*', "")
}

/// Extract the reply text, falling back to the raw JSON when the response
/// carries no text block.
fn reply_text(body: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let text = serde_json::from_value::<MessagesResponse>(value.clone())
        .ok()
        .and_then(|resp| resp.content.into_iter().next())
        .and_then(|block| block.text)
        .unwrap_or_else(|| value.to_string());
    Ok(strip_markup(&text))
}

pub struct AssistantRelay {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    system_prompt: String,
}

impl AssistantRelay {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| SecretString::from(k.to_string())),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Forward one user message and return the cleaned reply.
    pub async fn forward(&self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(LedgerError::validation("message required"));
        }
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LedgerError::Config("assistant.api_key is not set".to_string()))?;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: &self.system_prompt,
            messages: vec![ChatMessage {
                role: "user",
                content: message,
            }],
        };

        debug!(model = %self.model, "Forwarding chat message");
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Completion API request failed");
            return Err(LedgerError::RemoteRequest {
                status: status.as_u16(),
                body,
            });
        }

        reply_text(&body)
    }

    /// Handle a relay request end to end, never failing.
    pub async fn handle(&self, request: &RelayRequest) -> RelayResponse {
        RelayResponse::from_result(&self.forward(&request.message).await)
    }
}
