//! Tests for the error handling system

use reqwest::StatusCode;

use crate::error::mapping::map_http_error;
use crate::error::{ErrorContext, ServiceError};

#[test]
fn test_error_constructors() {
    let error = ServiceError::network("Connection refused");
    assert!(matches!(error, ServiceError::Network(_)));
    assert_eq!(error.to_string(), "Network error: Connection refused");

    let error = ServiceError::validation("Missing field");
    assert_eq!(error.to_string(), "Validation error: Missing field");
}

#[test]
fn test_context_wrapping() {
    let error = ServiceError::service("upstream exploded").with_context(
        ErrorContext::for_service("airtable")
            .status_code(500)
            .endpoint("Tickets"),
    );

    assert_eq!(error.service_name(), Some("airtable"));
    assert_eq!(error.status_code(), Some(500));
    // Display passes through to the inner error
    assert_eq!(error.to_string(), "Service error: upstream exploded");
}

#[test]
fn test_payload_unwraps_context() {
    let error = ServiceError::service("raw backend body")
        .with_context(ErrorContext::for_service("airtable"));

    assert_eq!(error.payload(), "raw backend body");
}

#[test]
fn test_map_http_error_by_status() {
    let mut context = ErrorContext::for_service("other");

    let error = map_http_error(StatusCode::UNAUTHORIZED, "{\"message\":\"no\"}", &mut context);
    assert!(matches!(error, ServiceError::Authentication(_)));

    let error = map_http_error(StatusCode::TOO_MANY_REQUESTS, "slow down", &mut context);
    assert!(matches!(error, ServiceError::RateLimit(_)));

    let error = map_http_error(StatusCode::INTERNAL_SERVER_ERROR, "boom", &mut context);
    assert!(matches!(error, ServiceError::Service(_)));
}

#[test]
fn test_airtable_mapping_keeps_body_verbatim() {
    let mut context = ErrorContext::for_service("airtable");
    let body = r#"{"error":{"type":"INVALID_REQUEST_UNKNOWN","message":"bad"}}"#;

    let error = map_http_error(StatusCode::BAD_REQUEST, body, &mut context);

    match error {
        ServiceError::Validation(msg) => assert_eq!(msg, body),
        other => panic!("Expected Validation error, got: {:?}", other),
    }
    assert_eq!(context.error_code.as_deref(), Some("INVALID_REQUEST_UNKNOWN"));
}
