//! User lookup tool
//!
//! Resolves a user identifier out of natural text ("check if user 123
//! exists") and reports whether a matching record exists in the users
//! table. The other tools re-use the structured `lookup` operation for
//! their mandatory pre-checks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use support_sdk::airtable::AirtableClient;
use support_sdk::Result;

use crate::extractor::{Fallback, FieldExtractor, FieldSpec};
use crate::tools::Tool;

const USER_ID_FIELD: &str = "User ID";

/// Outcome of a user existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup {
    /// At least one record matched the identifier
    Found,
    /// No record matched the identifier
    NotFound,
}

/// Tool checking whether a user exists in the record store
pub struct SearchUserTool {
    backend: Arc<AirtableClient>,
    extractor: Arc<FieldExtractor>,
}

impl SearchUserTool {
    /// Create the tool
    pub fn new(backend: Arc<AirtableClient>, extractor: Arc<FieldExtractor>) -> Self {
        Self { backend, extractor }
    }

    /// Check whether a user record exists for the identifier.
    ///
    /// Always hits the backend: existence is never cached, so verification
    /// inside other tools is fresh on every invocation. The identifier is
    /// matched as an opaque string.
    pub async fn lookup(&self, user_id: &str) -> Result<UserLookup> {
        let formula = AirtableClient::field_equals(USER_ID_FIELD, user_id);
        let list = self
            .backend
            .list_records(self.backend.users_table(), Some(&formula), &[])
            .await?;

        debug!("User lookup for {}: {} record(s)", user_id, list.records.len());

        if list.records.is_empty() {
            Ok(UserLookup::NotFound)
        } else {
            Ok(UserLookup::Found)
        }
    }
}

#[async_trait]
impl Tool for SearchUserTool {
    fn name(&self) -> &str {
        "SearchUser"
    }

    fn description(&self) -> &str {
        "Use tool when:\n\
         1. When customer wants to create a ticket. In this case we need to make sure customer exists, by asking and verifying user_id.\n\
         2. Customer wants to escalate issue. In this case, we need to make sure customer exists, by asking and verifying user_id."
    }

    async fn call(&self, input: &str) -> String {
        let fields = self
            .extractor
            .extract(input, &[FieldSpec::new("user_id", Fallback::DigitRun)])
            .await;

        let user_id = match fields.get("user_id") {
            Some(id) => id.clone(),
            None => return "Please provide a user ID to check.".to_string(),
        };

        match self.lookup(&user_id).await {
            Ok(UserLookup::Found) => format!("User {} exists in the database.", user_id),
            Ok(UserLookup::NotFound) => format!("User {} not found.", user_id),
            Err(e) => format!("Failed to check user {}. Error: {}", user_id, e.payload()),
        }
    }
}
