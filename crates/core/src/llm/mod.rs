//! Generative model clients.
//!
//! The collection pipeline only needs "prompt in, text out"; everything
//! provider-specific lives behind [`LlmClient`].

mod gemini;
mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LlmConfig, LlmProvider};

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic)
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 8192,
            temperature: 0.0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    pub usage: LlmUsage,
    /// Model that actually answered
    pub model: String,
}

/// A generative model: given a prompt, return a text completion, or fail.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "gemini", "ollama")
    fn provider(&self) -> &str;

    /// Model name (e.g., "gemini-2.0-flash-exp")
    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Build the client selected by `config.provider`.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let timeout = config.timeout_secs.map(|secs| Duration::from_secs(secs.into()));
    let http = build_http_client(timeout)?;

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Gemini => {
            let mut client = GeminiClient::with_http(http, config.resolve_api_key(), &config.model)
                .with_timeout(timeout);
            if let Some(api_base) = &config.api_base {
                client = client.with_api_base(api_base);
            }
            Arc::new(client)
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::with_http(http, &config.model).with_timeout(timeout);
            if let Some(api_base) = &config.api_base {
                client = client.with_api_base(api_base);
            }
            Arc::new(client)
        }
    };

    Ok(client)
}

fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| LlmError::NotConfigured(format!("HTTP client: {}", e)))
}

/// Map a transport error, telling timeouts apart.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Option<Duration>) -> LlmError {
    match timeout {
        Some(timeout) if err.is_timeout() => LlmError::Timeout(timeout),
        _ => LlmError::Http(err.to_string()),
    }
}
