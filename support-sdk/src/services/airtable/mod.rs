//! Airtable API client implementation
//!
//! This module provides a typed client for the tabular record backend
//! holding the Users and Tickets tables, with formula-based filtering and
//! record creation. Every call is a single attempt: failures surface to the
//! caller with the backend's payload intact.

mod models;
pub use models::*;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::config::{AirtableConfig, DEFAULT_PROVIDER};
use crate::core::{AuthenticatedClient, ServiceClient};
use crate::error::{Result, ServiceError};
use crate::services::common::{build_http_client, parse_error_response, UserAgent};

/// Client for the Airtable record backend
pub struct AirtableClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: AirtableConfig,

    /// Composed base URL, `{api_url}/{base_id}`
    base_url: String,
}

impl Default for AirtableClient {
    fn default() -> Self {
        let config = AirtableConfig::from_provider(&**DEFAULT_PROVIDER).unwrap_or_else(|_| {
            warn!("Failed to load Airtable config from environment, using defaults");
            AirtableConfig::default()
        });

        Self::new_with_config(config)
    }
}

impl AirtableClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new client with custom configuration
    pub fn new_with_config(config: AirtableConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("airtable-client".to_string()),
                ..UserAgent::default()
            }),
            Some(timeout),
        )
        .unwrap_or_else(|e| {
            panic!("Failed to build Airtable HTTP client: {}", e);
        });

        let base_url = config.base_url();

        Self {
            http_client,
            config,
            base_url,
        }
    }

    /// Name of the configured users table
    pub fn users_table(&self) -> &str {
        &self.config.users_table
    }

    /// Name of the configured tickets table
    pub fn tickets_table(&self) -> &str {
        &self.config.tickets_table
    }

    /// Build an equality filter formula, `{field}='value'`.
    ///
    /// The value is kept an opaque string; embedded single quotes are
    /// escaped so user-supplied identifiers cannot break the formula.
    pub fn field_equals(field: &str, value: &str) -> String {
        format!("{{{}}}='{}'", field, value.replace('\'', "\\'"))
    }

    /// List records of a table, optionally filtered by formula and
    /// projected to the given fields. Backend order is preserved.
    pub async fn list_records(
        &self,
        table: &str,
        filter: Option<&str>,
        fields: &[&str],
    ) -> Result<RecordList> {
        let url = format!("{}/{}", self.base_url, table);
        debug!("Listing records: GET {} filter={:?}", url, filter);

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(formula) = filter {
            query.push(("filterByFormula", formula));
        }
        for field in fields {
            query.push(("fields[]", field));
        }

        let mut auth_headers = HashMap::new();
        self.apply_auth(&mut auth_headers)?;

        let mut builder = self.http_client.get(&url).query(&query);
        for (key, value) in &auth_headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to send request: {}", e)))?;

        if response.status().is_success() {
            response
                .json::<RecordList>()
                .await
                .map_err(|e| ServiceError::parsing(format!("Failed to parse record list: {}", e)))
        } else {
            Err(parse_error_response("airtable", response).await)
        }
    }

    /// Create a single record in a table. One attempt, no retry; a non-2xx
    /// response maps to an error carrying the backend payload verbatim.
    pub async fn create_record(&self, table: &str, fields: RecordFields) -> Result<Record> {
        let url = format!("{}/{}", self.base_url, table);
        debug!("Creating record: POST {}", url);

        let mut auth_headers = HashMap::new();
        self.apply_auth(&mut auth_headers)?;

        let mut builder = self.http_client.post(&url);
        for (key, value) in &auth_headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .header("Content-Type", "application/json")
            .json(&CreateRecordRequest { fields })
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to send request: {}", e)))?;

        if response.status().is_success() {
            response
                .json::<Record>()
                .await
                .map_err(|e| ServiceError::parsing(format!("Failed to parse created record: {}", e)))
        } else {
            Err(parse_error_response("airtable", response).await)
        }
    }
}

#[async_trait]
impl ServiceClient for AirtableClient {
    fn name(&self) -> &str {
        "airtable"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health_check(&self) -> Result<bool> {
        let table = self.config.users_table.clone();
        match self.list_records(&table, None, &[]).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Airtable health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

impl AuthenticatedClient for AirtableClient {
    fn auth_type(&self) -> &str {
        "Bearer"
    }

    fn is_authenticated(&self) -> bool {
        !self.config.api_token.is_empty()
    }

    fn apply_auth(&self, headers: &mut HashMap<String, String>) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ServiceError::authentication(
                "No API token set for Airtable client",
            ));
        }

        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.api_token),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_equals_formula() {
        assert_eq!(AirtableClient::field_equals("User ID", "123"), "{User ID}='123'");
        assert_eq!(
            AirtableClient::field_equals("User ID", "o'brien"),
            "{User ID}='o\\'brien'"
        );
    }
}
