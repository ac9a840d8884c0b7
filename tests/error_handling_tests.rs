//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Every error body has the `{error: {message, status}, message}` envelope
//! - Unmatched routes and malformed input go through the same envelope

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_test::TestServer;
use biztime::prelude::*;
use serde_json::{Value, json};

fn make_server() -> TestServer {
    let router = ServerBuilder::new()
        .with_in_memory_store(InMemoryStore::new())
        .build()
        .unwrap();
    TestServer::try_new(router).unwrap()
}

fn assert_envelope(body: &Value, status: u16) {
    let message = body["message"].as_str().expect("message must be a string");
    assert_eq!(body["error"]["status"], status);
    assert_eq!(body["error"]["message"], message);
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_entity_not_found_returns_404() {
        let err = BizError::not_found("Company", "ghost");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_returns_409() {
        let err = BizError::Entity(EntityError::Conflict {
            entity_type: "Company",
            key: "apple".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_referential_violation_returns_422() {
        let err = BizError::Entity(EntityError::ReferentialViolation {
            entity_type: "Invoice",
            referenced: "Company",
            key: "ghost".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_error_returns_422() {
        let err = BizError::Validation(ValidationError::MissingField {
            field: "amt".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_json_returns_400() {
        let err = BizError::Request(RequestError::InvalidJson {
            message: "EOF while parsing".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_and_internal_return_500() {
        let storage = BizError::Storage(StorageError::Transaction {
            message: "deadlock detected".to_string(),
        });
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = BizError::Internal("oops".to_string());
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Response Rendering Tests
// =============================================================================

mod response_tests {
    use super::*;

    #[test]
    fn test_into_response_sets_status() {
        let response = BizError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_repeats_message() {
        let body = serde_json::to_value(BizError::not_found("Invoice", 7).to_response()).unwrap();
        assert_eq!(
            body,
            json!({
                "error": { "message": "Invoice 7 does not exist", "status": 404 },
                "message": "Invoice 7 does not exist"
            })
        );
    }
}

// =============================================================================
// End-to-end Error Tests
// =============================================================================

mod http_tests {
    use super::*;

    #[tokio::test]
    async fn test_unmatched_route_is_404_envelope() {
        let server = make_server();
        let response = server.get("/company/0").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": { "message": "Not Found", "status": 404 }, "message": "Not Found" })
        );
    }

    #[tokio::test]
    async fn test_not_found_entity_uses_envelope() {
        let server = make_server();
        let response = server.get("/invoices/999").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_envelope(&response.json::<Value>(), 404);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_envelope() {
        let server = make_server();
        let response = server
            .post("/companies")
            .bytes("{\"name\": ".into())
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&response.json::<Value>(), 400);
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_400_envelope() {
        let server = make_server();
        let response = server
            .post("/invoices")
            .json(&json!({ "comp_code": "apple", "amt": "lots" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&response.json::<Value>(), 400);
    }

    #[tokio::test]
    async fn test_validation_failure_is_422_envelope() {
        let server = make_server();
        let response = server
            .post("/invoices")
            .json(&json!({ "comp_code": "apple" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_envelope(&body, 422);
        assert_eq!(body["message"], "Missing required field 'amt'");
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = make_server();
        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], "ok");
    }
}
