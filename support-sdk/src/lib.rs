//! # Support SDK
//!
//! A unified SDK for the external service integrations of the support-desk
//! assistant.
//!
//! This crate provides:
//!
//! - Typed clients for the three external services: the Airtable record
//!   backend (Users and Tickets tables), an OpenAI-compatible LLM API, and
//!   a Supabase-compatible vector store
//! - A normalized error handling system with per-service payload mapping
//! - Configuration management utilities backed by environment variables
//!
//! ## Architecture
//!
//! The SDK is designed around the following key abstractions:
//!
//! - `ServiceClient`: the base trait for all external service clients
//! - `AuthenticatedClient`: credential handling for clients
//! - `ServiceError`: the normalized error type
//! - `ConfigProvider`: pluggable configuration sources

// Re-export core modules
pub mod core;
pub use core::{AuthenticatedClient, ServiceClient};

// Re-export service-specific modules
pub mod services;
pub use services::{airtable, llm, vectorstore};

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, ConfigProviderExt, ServiceConfig};

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

/// Create a record-backend client configured from the environment
pub fn airtable_client() -> airtable::AirtableClient {
    airtable::AirtableClient::new()
}

/// Create an LLM client configured from the environment
pub fn llm_client() -> llm::LlmClient {
    llm::LlmClient::new()
}
