//! Mock tests for the vector store client

use serde_json::json;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::VectorStoreConfig;
use crate::error::ServiceError;
use crate::services::vectorstore::VectorStoreClient;

/// Creates a test client pointed at the mock server
fn create_test_client(mock_server: &MockServer) -> VectorStoreClient {
    VectorStoreClient::new_with_config(VectorStoreConfig {
        url: mock_server.uri(),
        anon_key: "mock_anon_key".to_string(),
        timeout_seconds: 5,
        ..VectorStoreConfig::default()
    })
}

#[tokio::test]
async fn test_match_documents() {
    let mock_server = MockServer::start().await;

    let mock_response = json!([
        {"content": "Refunds are processed within 5 business days.", "similarity": 0.91},
        {"content": "Contact support to escalate an issue.", "similarity": 0.74}
    ]);

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/match_documents"))
        .and(header("apikey", "mock_anon_key"))
        .and(header("Authorization", "Bearer mock_anon_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let matches = client.match_documents(&[0.1, 0.2, 0.3], 2).await.unwrap();

    assert_eq!(matches.len(), 2);
    assert!(matches[0].content.contains("Refunds"));
    assert!(matches[0].similarity > matches[1].similarity);
}

#[tokio::test]
async fn test_error_mapping() {
    let mock_server = MockServer::start().await;

    let error_body = json!({
        "code": "PGRST202",
        "message": "Could not find the function public.match_documents"
    });

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/match_documents"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&error_body))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let error = client.match_documents(&[0.1], 1).await.unwrap_err();

    match error {
        ServiceError::WithContext { inner, .. } => match *inner {
            ServiceError::NotFound(msg) => assert!(msg.contains("match_documents")),
            other => panic!("Expected NotFound error, got: {:?}", other),
        },
        other => panic!("Expected contextualized error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_unconfigured_store_is_an_error() {
    // from_env must fail cleanly when the store is not configured; callers
    // downgrade this to "retrieval disabled"
    std::env::remove_var("SUPABASE_URL");
    std::env::remove_var("SUPABASE_ANON_KEY");

    assert!(VectorStoreClient::from_env().is_err());
}
