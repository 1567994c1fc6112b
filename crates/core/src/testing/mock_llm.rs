//! Mock model client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Produces the completion text (or an error) for a prompt.
type ResponseHandler = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// Mock implementation of the LlmClient trait.
///
/// Provides controllable behavior for testing:
/// - Answer every prompt through a configurable handler
/// - Record prompts for assertions
/// - Fail once on demand
///
/// Clones share state, so a test can keep one handle while the collector
/// owns another.
#[derive(Clone)]
pub struct MockLlmClient {
    handler: Arc<RwLock<ResponseHandler>>,
    prompts: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<LlmError>>>,
}

impl std::fmt::Debug for MockLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmClient")
            .field("handler", &"<handler>")
            .field("prompts", &"<prompts>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    /// A client that fails every query.
    pub fn new() -> Self {
        Self::with_handler(|_| Err(LlmError::NotConfigured("no mock handler".to_string())))
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(RwLock::new(Box::new(handler))),
            prompts: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the handler for subsequent queries.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        *self.handler.write().await = Box::new(handler);
    }

    /// Configure the next query to fail with the given error.
    pub async fn set_next_error(&self, error: LlmError) {
        *self.next_error.write().await = Some(error);
    }

    /// Prompts received so far, in order.
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    pub async fn query_count(&self) -> usize {
        self.prompts.read().await.len()
    }

    pub async fn clear_recorded(&self) {
        self.prompts.write().await.clear();
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.write().await.push(request.prompt.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let text = (self.handler.read().await)(&request.prompt)?;
        Ok(CompletionResponse {
            text,
            usage: LlmUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_and_recording() {
        let client = MockLlmClient::with_handler(|prompt| Ok(format!("echo: {}", prompt)));

        let response = client.complete(CompletionRequest::new("hello")).await.unwrap();
        assert_eq!(response.text, "echo: hello");
        assert_eq!(client.recorded_prompts().await, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_next_error_fires_once() {
        let client = MockLlmClient::with_handler(|_| Ok("{}".to_string()));
        client.set_next_error(LlmError::EmptyResponse).await;

        assert!(client.complete(CompletionRequest::new("a")).await.is_err());
        assert!(client.complete(CompletionRequest::new("b")).await.is_ok());
        assert_eq!(client.query_count().await, 2);
    }

    #[tokio::test]
    async fn test_default_client_fails() {
        let client = MockLlmClient::new();
        let result = client.complete(CompletionRequest::new("a")).await;
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }
}
