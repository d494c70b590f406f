//! Airtable API data models
//!
//! Type definitions for record listing and creation requests/responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map of a record, keyed by column name
pub type RecordFields = Map<String, Value>;

/// A single record in a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier assigned by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Creation timestamp assigned by the backend
    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,

    /// Column values
    #[serde(default)]
    pub fields: RecordFields,
}

impl Record {
    /// Read a field as a string, regardless of whether the backend stored
    /// it as a string or a number.
    pub fn field_str(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Response shape of record listing endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordList {
    /// Records returned by the query, in backend order
    #[serde(default)]
    pub records: Vec<Record>,

    /// Pagination offset, present when more records are available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Body of a record creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    /// Column values for the new record
    pub fields: RecordFields,
}
