//! Ticket status tool
//!
//! Answers "what's the status of my tickets" style requests: verifies the
//! user exists, then lists every ticket for that user, one line per
//! ticket, in the order the backend returned them.

use std::sync::Arc;

use async_trait::async_trait;

use support_sdk::airtable::AirtableClient;

use crate::extractor::{Fallback, FieldExtractor, FieldSpec};
use crate::tools::search_user::{SearchUserTool, UserLookup};
use crate::tools::{Tool, USER_MISSING_DENIAL};

/// Tool reporting the status of a user's tickets
pub struct TicketStatusTool {
    backend: Arc<AirtableClient>,
    extractor: Arc<FieldExtractor>,
    lookup: Arc<SearchUserTool>,
}

impl TicketStatusTool {
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
impl Tool for TicketStatusTool {
    fn name(&self) -> &str {
        "TicketStatus"
    }

    fn description(&self) -> &str {
        "Use tool when:\n\
         1. Customer wants to check the status for his tickets. Before this you must ask the user_id to check if customer exists in database.\n\
         If there are multiple tickets, then respond to all.\n\
         \n\
         Note: If you don't find anything then reply that \"Sorry, No such ticket exists\"."
    }

    async fn call(&self, input: &str) -> String {
        let fields = self
            .extractor
            .extract(input, &[FieldSpec::new("user_id", Fallback::DigitRun)])
            .await;

        let user_id = match fields.get("user_id") {
            Some(id) => id.clone(),
            None => return "Please provide a user ID to check ticket status.".to_string(),
        };

        match self.lookup.lookup(&user_id).await {
            Ok(UserLookup::Found) => {}
            Ok(UserLookup::NotFound) => return USER_MISSING_DENIAL.to_string(),
            Err(e) => return format!("Failed to verify user {}. Error: {}", user_id, e.payload()),
        }

        let formula = AirtableClient::field_equals("User ID", &user_id);
        let list = match self
            .backend
            .list_records(
                self.backend.tickets_table(),
                Some(&formula),
                &["Status", "Reason"],
            )
            .await
        {
            Ok(list) => list,
            Err(e) => return format!("Failed to fetch tickets. Error: {}", e.payload()),
        };

        if list.records.is_empty() {
            return "No tickets found for this user.".to_string();
        }

        // Backend order is preserved; any ordering guarantee comes from the
        // backend, not from this tool
        list.records
            .iter()
            .map(|record| {
                format!(
                    "{} → Status: {}",
                    record.field_str("Reason").unwrap_or_else(|| "N/A".to_string()),
                    record.field_str("Status").unwrap_or_else(|| "N/A".to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
