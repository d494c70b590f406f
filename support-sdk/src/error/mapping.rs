//! Error mapping for service-specific APIs
//!
//! Converts service-specific error responses to the normalized
//! ServiceError type while keeping the original payload text intact.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError};

/// Map an OpenAI-compatible LLM API error to a ServiceError
pub fn map_llm_error(status: StatusCode, json: &Value, context: &mut ErrorContext) -> ServiceError {
    context.service = "llm".to_string();

    if let Some(error) = json.get("error") {
        if let Some(error_type) = error.get("type").and_then(|t| t.as_str()) {
            context.add("error_type", error_type);
        }

        if let Some(code) = error.get("code").and_then(|c| c.as_str()) {
            context.error_code = Some(code.to_string());
        }

        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown LLM API error");

        return status_to_error(status, message);
    }

    let message = json
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error");

    status_to_error(status, message)
}

/// Map an Airtable backend error to a ServiceError
///
/// The backend's payload is kept verbatim as the error message: tools
/// surface creation failures to the user exactly as the backend reported
/// them.
pub fn map_airtable_error(
    status: StatusCode,
    body: &str,
    json: &Value,
    context: &mut ErrorContext,
) -> ServiceError {
    context.service = "airtable".to_string();

    if let Some(error_type) = json
        .get("error")
        .and_then(|e| e.get("type"))
        .and_then(|t| t.as_str())
    {
        context.error_code = Some(error_type.to_string());
    }

    status_to_error(status, body)
}

/// Map a vector-store (Supabase-style) error to a ServiceError
pub fn map_vectorstore_error(
    status: StatusCode,
    json: &Value,
    context: &mut ErrorContext,
) -> ServiceError {
    context.service = "vectorstore".to_string();

    if let Some(code) = json.get("code").and_then(|c| c.as_str()) {
        context.error_code = Some(code.to_string());
    }

    let message = json
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown vector store error");

    status_to_error(status, message)
}

/// Map a generic HTTP error to a ServiceError
///
/// Dispatches on the service name already recorded in the context, falling
/// back to a status-based mapping for anything unrecognized.
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> ServiceError {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match context.service.as_str() {
            "llm" => return map_llm_error(status, &json, context),
            "airtable" => return map_airtable_error(status, body, &json, context),
            "vectorstore" => return map_vectorstore_error(status, &json, context),
            _ => {
                let message = json
                    .get("message")
                    .or_else(|| json.get("error"))
                    .and_then(|m| m.as_str())
                    .unwrap_or(body);

                return status_to_error(status, message);
            }
        }
    }

    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };

    status_to_error(status, message)
}

/// Status-code based classification shared by the service mappers
fn status_to_error(status: StatusCode, message: impl Into<String>) -> ServiceError {
    let message = message.into();
    match status {
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::authorization(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::rate_limit(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::validation(message)
        }
        StatusCode::NOT_FOUND => ServiceError::not_found(message),
        StatusCode::REQUEST_TIMEOUT => ServiceError::timeout(message),
        _ => ServiceError::service(message),
    }
}
