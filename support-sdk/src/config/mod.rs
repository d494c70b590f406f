//! Configuration management for service clients
//!
//! This module provides utilities for loading and validating configuration
//! for the external services (tabular backend, LLM API, vector store), with
//! support for environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{Result, ServiceError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.parse::<i64>().map_err(|e| {
            ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e))
        })
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(
            &key.to_uppercase()
                .replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
        );

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => ServiceError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Debug, Clone, Default)]
pub struct CompositeConfigProvider<P: ConfigProvider> {
    /// Ordered list of config providers to try
    providers: Vec<P>,
}

impl<P: ConfigProvider> CompositeConfigProvider<P> {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a provider to the chain
    pub fn add_provider(&mut self, provider: P) {
        self.providers.push(provider);
    }
}

impl<P: ConfigProvider> ConfigProvider for CompositeConfigProvider<P> {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }

        Err(ServiceError::configuration(format!(
            "Configuration key not found in any provider: {}",
            key
        )))
    }
}

/// Global default configuration provider (plain environment variables)
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new()));

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

/// Configuration for the Airtable record backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirtableConfig {
    /// Bearer token for the backend API
    pub api_token: String,

    /// Base (workspace) identifier appended to the API root
    pub base_id: String,

    /// Name of the users table
    pub users_table: String,

    /// Name of the tickets table
    pub tickets_table: String,

    /// API root URL
    pub api_url: String,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_id: String::new(),
            users_table: "Users".to_string(),
            tickets_table: "Tickets".to_string(),
            api_url: "https://api.airtable.com/v0".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl AirtableConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let api_token = provider.get_string("airtable_api_token")?;
        let base_id = provider.get_string("airtable_base_id")?;
        let users_table = provider.get_string_or("airtable_users_table", "Users");
        let tickets_table = provider.get_string_or("airtable_tickets_table", "Tickets");
        let api_url = provider.get_string_or("airtable_api_url", "https://api.airtable.com/v0");
        let timeout_seconds = provider.get_int_or("airtable_timeout_seconds", 30) as u64;

        let config = Self {
            api_token,
            base_id,
            users_table,
            tickets_table,
            api_url,
            timeout_seconds,
        };

        config.validate()?;
        Ok(config)
    }

    /// Full base URL for record endpoints, `{api_url}/{base_id}`
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), self.base_id)
    }
}

impl ServiceConfig for AirtableConfig {
    fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            return Err(ServiceError::configuration("Backend API token is required"));
        }

        if self.base_id.is_empty() {
            return Err(ServiceError::configuration("Backend base ID is required"));
        }

        if self.users_table.is_empty() || self.tickets_table.is_empty() {
            return Err(ServiceError::configuration("Backend table names are required"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "airtable"
    }
}

/// Configuration for the LLM provider (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Base URL (Groq-hosted endpoint by default)
    pub base_url: String,

    /// Conversation model
    pub model: String,

    /// Model used for field extraction; None disables the model-assisted
    /// parser and leaves extraction to the regex fallbacks
    pub parser_model: Option<String>,

    /// Model used for embeddings
    pub embedding_model: String,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "openai/gpt-oss-120b".to_string(),
            parser_model: None,
            embedding_model: "text-embedding-004".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl LlmConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let api_key = provider.get_string("llm_api_key")?;
        let base_url = provider.get_string_or("llm_api_url", "https://api.groq.com/openai/v1");
        let model = provider.get_string_or("llm_model", "openai/gpt-oss-120b");
        let parser_model = provider.get_string("llm_parser_model").ok();
        let embedding_model = provider.get_string_or("llm_embedding_model", "text-embedding-004");
        let timeout_seconds = provider.get_int_or("llm_timeout_seconds", 30) as u64;

        let config = Self {
            api_key,
            base_url,
            model,
            parser_model,
            embedding_model,
            timeout_seconds,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for LlmConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ServiceError::configuration("LLM API key is required"));
        }

        if self.base_url.is_empty() {
            return Err(ServiceError::configuration("LLM base URL is required"));
        }

        if self.model.is_empty() {
            return Err(ServiceError::configuration("LLM model name is required"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "llm"
    }
}

/// Configuration for the vector store (Supabase-compatible REST API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Project URL
    pub url: String,

    /// Anonymous API key
    pub anon_key: String,

    /// Table holding the embedded documents
    pub table: String,

    /// Name of the similarity-search RPC function
    pub query_name: String,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: "documents".to_string(),
            query_name: "match_documents".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl VectorStoreConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let url = provider.get_string("supabase_url")?;
        let anon_key = provider.get_string("supabase_anon_key")?;
        let table = provider.get_string_or("supabase_table", "documents");
        let query_name = provider.get_string_or("supabase_query_name", "match_documents");
        let timeout_seconds = provider.get_int_or("supabase_timeout_seconds", 30) as u64;

        let config = Self {
            url,
            anon_key,
            table,
            query_name,
            timeout_seconds,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for VectorStoreConfig {
    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ServiceError::configuration("Vector store URL is required"));
        }

        if self.anon_key.is_empty() {
            return Err(ServiceError::configuration("Vector store API key is required"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "vectorstore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("key1", "value1");
        provider.set("key2", "123");

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_int("key2").unwrap(), 123);
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn test_env_config_provider_key_format() {
        let provider = EnvConfigProvider::new().with_prefix("TEST");

        assert_eq!(provider.format_key("api_key"), "TEST_API_KEY");
        assert_eq!(provider.format_key("base-url"), "TEST_BASE_URL");

        let bare = EnvConfigProvider::new();
        assert_eq!(bare.format_key("airtable_api_token"), "AIRTABLE_API_TOKEN");
    }

    #[test]
    fn test_composite_config_provider() {
        let mut mem1 = MemoryConfigProvider::new();
        mem1.set("key1", "value1");

        let mut mem2 = MemoryConfigProvider::new();
        mem2.set("key2", "value2");

        let mut provider = CompositeConfigProvider::new();
        provider.add_provider(mem1);
        provider.add_provider(mem2);

        assert_eq!(provider.get_string("key1").unwrap(), "value1");
        assert_eq!(provider.get_string("key2").unwrap(), "value2");
        assert!(provider.get_string("key3").is_err());
    }

    #[test]
    fn test_tabular_config() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("airtable_api_token", "test_token");
        provider.set("airtable_base_id", "appTEST");

        let config = AirtableConfig::from_provider(&provider).unwrap();
        assert_eq!(config.api_token, "test_token");
        assert_eq!(config.users_table, "Users");
        assert_eq!(config.tickets_table, "Tickets");
        assert_eq!(config.base_url(), "https://api.airtable.com/v0/appTEST");

        let config = AirtableConfig {
            api_token: "".to_string(),
            ..AirtableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_llm_config() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("llm_api_key", "test_api_key");
        provider.set("llm_parser_model", "gemini-2.5-flash");

        let config = LlmConfig::from_provider(&provider).unwrap();
        assert_eq!(config.api_key, "test_api_key");
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.parser_model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_vectorstore_config_optional() {
        let provider = MemoryConfigProvider::new();
        assert!(VectorStoreConfig::from_provider(&provider).is_err());
    }
}
