//! Vector store client implementation
//!
//! This module provides a client for a Supabase-compatible vector store
//! exposing a similarity-search RPC over pre-embedded documents. Query
//! embeddings are produced separately (see the LLM client); this client
//! only performs the similarity call.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{VectorStoreConfig, DEFAULT_PROVIDER};
use crate::core::{AuthenticatedClient, ServiceClient};
use crate::error::{Result, ServiceError};
use crate::services::common::{build_http_client, parse_error_response, UserAgent};

/// A document returned by the similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedDocument {
    /// Document text
    #[serde(default)]
    pub content: String,

    /// Cosine similarity to the query
    #[serde(default)]
    pub similarity: f32,

    /// Arbitrary document metadata
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Body of the similarity-search RPC
#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}

/// Client for the vector store's similarity-search RPC
pub struct VectorStoreClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: VectorStoreConfig,
}

impl VectorStoreClient {
    /// Create a new client with configuration from the environment.
    ///
    /// Returns an error when the store is unconfigured; callers treat that
    /// as "retrieval disabled", not a failure.
    pub fn from_env() -> Result<Self> {
        let config = VectorStoreConfig::from_provider(&**DEFAULT_PROVIDER)?;
        Ok(Self::new_with_config(config))
    }

    /// Create a new client with custom configuration
    pub fn new_with_config(config: VectorStoreConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("vectorstore-client".to_string()),
                ..UserAgent::default()
            }),
            Some(timeout),
        )
        .unwrap_or_else(|e| {
            panic!("Failed to build vector store HTTP client: {}", e);
        });

        Self {
            http_client,
            config,
        }
    }

    /// Retrieve the `k` documents most similar to the query embedding,
    /// most similar first.
    pub async fn match_documents(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<MatchedDocument>> {
        let url = format!(
            "{}/rest/v1/rpc/{}",
            self.config.url.trim_end_matches('/'),
            self.config.query_name
        );
        debug!("Similarity search: POST {} k={}", url, k);

        let mut auth_headers = HashMap::new();
        self.apply_auth(&mut auth_headers)?;

        let mut builder = self.http_client.post(&url);
        for (key, value) in &auth_headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .header("Content-Type", "application/json")
            .json(&MatchRequest {
                query_embedding,
                match_count: k,
            })
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to send request: {}", e)))?;

        if response.status().is_success() {
            response
                .json::<Vec<MatchedDocument>>()
                .await
                .map_err(|e| ServiceError::parsing(format!("Failed to parse matches: {}", e)))
        } else {
            Err(parse_error_response("vectorstore", response).await)
        }
    }
}

#[async_trait]
impl ServiceClient for VectorStoreClient {
    fn name(&self) -> &str {
        "vectorstore"
    }

    fn base_url(&self) -> &str {
        &self.config.url
    }

    async fn health_check(&self) -> Result<bool> {
        // A zero-vector probe with a single match exercises auth and the RPC
        match self.match_documents(&[0.0; 8], 1).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Vector store health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

impl AuthenticatedClient for VectorStoreClient {
    fn auth_type(&self) -> &str {
        "ApiKey"
    }

    fn is_authenticated(&self) -> bool {
        !self.config.anon_key.is_empty()
    }

    fn apply_auth(&self, headers: &mut HashMap<String, String>) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ServiceError::authentication(
                "No API key set for vector store client",
            ));
        }

        headers.insert("apikey".to_string(), self.config.anon_key.clone());
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.anon_key),
        );

        Ok(())
    }
}
