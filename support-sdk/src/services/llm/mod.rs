//! LLM API client implementation
//!
//! This module provides a typed client for an OpenAI-compatible LLM API
//! (the Groq-hosted endpoint by default), with support for chat completions
//! and embeddings. The same client serves the main conversation, the field
//! extraction parser (a separate model name), and RAG embeddings.

mod models;
pub use models::*;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::config::{LlmConfig, DEFAULT_PROVIDER};
use crate::core::{AuthenticatedClient, ServiceClient};
use crate::error::{Result, ServiceError};
use crate::services::common::{build_http_client, parse_error_response, UserAgent};
use crate::util::truncate_string;

/// Client for an OpenAI-compatible LLM API
pub struct LlmClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: LlmConfig,
}

impl Default for LlmClient {
    fn default() -> Self {
        let config = LlmConfig::from_provider(&**DEFAULT_PROVIDER).unwrap_or_else(|_| {
            warn!("Failed to load LLM config from environment, using defaults");
            LlmConfig::default()
        });

        Self::new_with_config(config)
    }
}

impl LlmClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new client with custom configuration
    pub fn new_with_config(config: LlmConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("llm-client".to_string()),
                ..UserAgent::default()
            }),
            Some(timeout),
        )
        .unwrap_or_else(|e| {
            panic!("Failed to build LLM HTTP client: {}", e);
        });

        Self {
            http_client,
            config,
        }
    }

    /// The configured conversation model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// The configured parser model, when field extraction is model-assisted
    pub fn parser_model(&self) -> Option<&str> {
        self.config.parser_model.as_deref()
    }

    /// Send a chat completion request
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post("chat/completions", &request).await
    }

    /// Send a text embedding request
    pub async fn embeddings(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        self.post("embeddings", &request).await
    }

    /// List available models
    pub async fn list_models(&self) -> Result<ListModelsResponse> {
        self.get("models").await
    }

    /// Run a conversation and return the assistant's reply text
    pub async fn chat(&self, messages: Vec<ChatMessage>, model: Option<&str>) -> Result<String> {
        let model = model.unwrap_or(&self.config.model);

        if let Some(last) = messages.last() {
            debug!(
                "Completion request ({} messages, model {}): {}",
                messages.len(),
                model,
                truncate_string(&last.content, 120)
            );
        }

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: Some(0.0),
            ..Default::default()
        };

        let response = self.chat_completion(request).await?;
        if let Some(choice) = response.choices.first() {
            if let Some(content) = &choice.message.content {
                Ok(content.clone())
            } else {
                Err(ServiceError::parsing("Empty completion response"))
            }
        } else {
            Err(ServiceError::parsing("No completion choices returned"))
        }
    }

    /// Create a simple single-shot completion with just a prompt
    pub async fn simple_completion(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt)], model).await
    }

    /// Generate an embedding vector for a text
    pub async fn embed_text(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>> {
        let model = model.unwrap_or(&self.config.embedding_model);

        let request = EmbeddingRequest {
            model: model.to_string(),
            input: EmbeddingInput::String(text.to_string()),
        };

        let response = self.embeddings(request).await?;
        if let Some(embedding) = response.data.first() {
            Ok(embedding.embedding.clone())
        } else {
            Err(ServiceError::parsing("No embeddings returned"))
        }
    }

    async fn post<T, R>(&self, endpoint: &str, request: &T) -> Result<R>
    where
        T: serde::Serialize + Send + Sync,
        R: for<'de> serde::Deserialize<'de> + Send,
    {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!("Sending request to LLM API: POST {}", url);

        let mut auth_headers = HashMap::new();
        self.apply_auth(&mut auth_headers)?;

        let mut builder = self.http_client.post(&url);
        for (key, value) in &auth_headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to send request: {}", e)))?;

        if response.status().is_success() {
            response
                .json::<R>()
                .await
                .map_err(|e| ServiceError::parsing(format!("Failed to parse response: {}", e)))
        } else {
            Err(parse_error_response("llm", response).await)
        }
    }

    async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: for<'de> serde::Deserialize<'de> + Send,
    {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        debug!("Sending request to LLM API: GET {}", url);

        let mut auth_headers = HashMap::new();
        self.apply_auth(&mut auth_headers)?;

        let mut builder = self.http_client.get(&url);
        for (key, value) in &auth_headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to send request: {}", e)))?;

        if response.status().is_success() {
            response
                .json::<R>()
                .await
                .map_err(|e| ServiceError::parsing(format!("Failed to parse response: {}", e)))
        } else {
            Err(parse_error_response("llm", response).await)
        }
    }
}

#[async_trait]
impl ServiceClient for LlmClient {
    fn name(&self) -> &str {
        "llm"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("LLM health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

impl AuthenticatedClient for LlmClient {
    fn auth_type(&self) -> &str {
        "Bearer"
    }

    fn is_authenticated(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn apply_auth(&self, headers: &mut HashMap<String, String>) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ServiceError::authentication("No API key set for LLM client"));
        }

        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.api_key),
        );

        Ok(())
    }
}
