use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Request timeout for chat completions.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;
const OPENAI_TEMPERATURE: f64 = 0.1;

/// Wire format spoken by a chat backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVendor {
    OpenAi,
    Anthropic,
}

impl ChatVendor {
    fn label(&self) -> &'static str {
        match self {
            ChatVendor::OpenAi => "OpenAI",
            ChatVendor::Anthropic => "Claude",
        }
    }
}

/// Everything needed to open a conversation.
#[derive(Clone)]
pub struct SessionSpec {
    /// Identifier scoping the conversation, e.g. `enrichment-acme.com`.
    pub session_id: String,
    /// System instructions for the assistant.
    pub system_message: String,
    pub vendor: ChatVendor,
    pub model: String,
    pub api_key: String,
}

impl std::fmt::Debug for SessionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSpec")
            .field("session_id", &self.session_id)
            .field("vendor", &self.vendor)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Opens conversational sessions with a chat backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open_session(&self, spec: SessionSpec) -> Result<Box<dyn ChatSession>, AppError>;
}

/// A stateful conversation: one user message in, one assistant reply out.
#[async_trait]
pub trait ChatSession: Send {
    async fn send_message(&mut self, text: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat transport speaking the OpenAI and Anthropic HTTP APIs.
#[derive(Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
    openai_base_url: String,
    anthropic_base_url: String,
}

impl HttpChatTransport {
    /// Creates a new `HttpChatTransport` using the base URLs from `config`.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create chat HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            openai_base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            anthropic_base_url: config.anthropic_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open_session(&self, spec: SessionSpec) -> Result<Box<dyn ChatSession>, AppError> {
        let base_url = match spec.vendor {
            ChatVendor::OpenAi => self.openai_base_url.clone(),
            ChatVendor::Anthropic => self.anthropic_base_url.clone(),
        };
        tracing::debug!(
            "Opening {} chat session {} (model {})",
            spec.vendor.label(),
            spec.session_id,
            spec.model
        );

        Ok(Box::new(HttpChatSession {
            client: self.client.clone(),
            base_url,
            spec,
            history: Vec::new(),
        }))
    }
}

struct HttpChatSession {
    client: reqwest::Client,
    base_url: String,
    spec: SessionSpec,
    history: Vec<ChatMessage>,
}

impl HttpChatSession {
    async fn post(&self, request: reqwest::RequestBuilder, body: Value) -> Result<Value, AppError> {
        let label = self.spec.vendor.label();
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::from_transport(label, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("{} returned error {}: {}", label, status, error_text);
            return Err(AppError::Upstream {
                provider: label.to_string(),
                status: status.as_u16(),
                body: error_text,
            });
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to decode {} response: {}", label, e))
        })
    }

    async fn complete_openai(&self) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut messages = vec![json!({
            "role": "system",
            "content": self.spec.system_message,
        })];
        messages.extend(
            self.history
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        let body = json!({
            "model": self.spec.model,
            "messages": messages,
            "temperature": OPENAI_TEMPERATURE,
        });

        let request = self.client.post(&url).bearer_auth(&self.spec.api_key);
        let data = self.post(request, body).await?;

        Ok(data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn complete_anthropic(&self) -> Result<String, AppError> {
        let url = format!("{}/v1/messages", self.base_url);

        let body = json!({
            "model": self.spec.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "system": self.spec.system_message,
            "messages": self.history,
        });

        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.spec.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let data = self.post(request, body).await?;

        // Claude answers with a list of content blocks; only text blocks matter here.
        let text = data
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}

#[async_trait]
impl ChatSession for HttpChatSession {
    async fn send_message(&mut self, text: &str) -> Result<String, AppError> {
        self.history.push(ChatMessage {
            role: "user",
            content: text.to_string(),
        });

        tracing::info!(
            "Sending message to {} (session {})",
            self.spec.vendor.label(),
            self.spec.session_id
        );

        let result = match self.spec.vendor {
            ChatVendor::OpenAi => self.complete_openai().await,
            ChatVendor::Anthropic => self.complete_anthropic().await,
        };

        match result {
            Ok(reply) => {
                self.history.push(ChatMessage {
                    role: "assistant",
                    content: reply.clone(),
                });
                Ok(reply)
            }
            Err(e) => {
                // Drop the unanswered turn so the session can be retried by the caller.
                self.history.pop();
                Err(e)
            }
        }
    }
}
