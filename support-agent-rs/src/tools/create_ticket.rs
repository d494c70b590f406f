//! Ticket creation tool
//!
//! Turns "create a ticket for user 12 about a login issue" into a new
//! record in the tickets table. Creation is refused outright when the user
//! does not exist: the existence pre-check runs fresh on every invocation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde_json::json;
use tracing::info;

use support_sdk::airtable::{AirtableClient, RecordFields};

use crate::extractor::{Fallback, FieldExtractor, FieldSpec};
use crate::tools::search_user::{SearchUserTool, UserLookup};
use crate::tools::{Tool, USER_MISSING_DENIAL};

/// Status every new ticket is created with; transitions happen elsewhere
const INITIAL_STATUS: &str = "In Progress";

/// Tool creating support tickets in the record store
pub struct CreateTicketTool {
    backend: Arc<AirtableClient>,
    extractor: Arc<FieldExtractor>,
    lookup: Arc<SearchUserTool>,
}

impl CreateTicketTool {
    /// Create the tool
    pub fn new(
        backend: Arc<AirtableClient>,
        extractor: Arc<FieldExtractor>,
        lookup: Arc<SearchUserTool>,
    ) -> Self {
        Self {
            backend,
            extractor,
            lookup,
        }
    }
}

#[async_trait]
impl Tool for CreateTicketTool {
    fn name(&self) -> &str {
        "CreateTicket"
    }

    fn description(&self) -> &str {
        "Use tool when:\n\
         Client faces a problem and needs help of support team.\n\
         \n\
         IMPORTANT:\n\
         Before using 'CreateTicket' use tool 'SearchUser' and make sure user exists in database. If not - don't use it and say 'Sorry to inform, but this user does not exist'"
    }

    async fn call(&self, input: &str) -> String {
        let fields = self
            .extractor
            .extract(
                input,
                &[
                    FieldSpec::new("user_id", Fallback::DigitRun),
                    FieldSpec::new("issue", Fallback::KeywordSplit("about")),
                ],
            )
            .await;

        let user_id = match fields.get("user_id") {
            Some(id) => id.clone(),
            None => return "Please provide a user ID.".to_string(),
        };

        let issue = match fields.get("issue") {
            Some(issue) => issue.clone(),
            None => return "Please describe the issue.".to_string(),
        };

        match self.lookup.lookup(&user_id).await {
            Ok(UserLookup::Found) => {}
            Ok(UserLookup::NotFound) => return USER_MISSING_DENIAL.to_string(),
            Err(e) => return format!("Failed to verify user {}. Error: {}", user_id, e.payload()),
        }

        let mut record = RecordFields::new();
        record.insert("User ID".to_string(), json!(user_id));
        record.insert("Reason".to_string(), json!(issue));
        record.insert("Status".to_string(), json!(INITIAL_STATUS));
        record.insert(
            "Submission Date".to_string(),
            json!(Local::now().format("%Y-%m-%d").to_string()),
        );

        // One attempt: a failed creation is reported with the backend's
        // payload, never retried
        match self
            .backend
            .create_record(self.backend.tickets_table(), record)
            .await
        {
            Ok(_) => {
                info!("Ticket created for user {}", user_id);
                format!(
                    "Ticket created successfully for user {} - Issue: {}",
                    user_id, issue
                )
            }
            Err(e) => format!("Failed to create ticket. Error: {}", e.payload()),
        }
    }
}
