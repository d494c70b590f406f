//! Core abstractions for the support SDK
//!
//! The trait seams every service client implements:
//!
//! - `ServiceClient`: identity and health checking
//! - `AuthenticatedClient`: credential handling and header application

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

/// Base trait for all service clients
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// The client name/identifier
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;

    /// Health check for the service
    async fn health_check(&self) -> Result<bool>;
}

/// Trait for clients that require authentication
pub trait AuthenticatedClient: Send + Sync {
    /// Authentication type (e.g., "Bearer", "ApiKey")
    fn auth_type(&self) -> &str;

    /// Check if client is authenticated
    fn is_authenticated(&self) -> bool;

    /// Add authentication headers to a request
    fn apply_auth(&self, headers: &mut HashMap<String, String>) -> Result<()>;
}
