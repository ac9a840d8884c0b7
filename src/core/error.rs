//! Typed error handling for BizTime
//!
//! Every fallible operation in the crate returns [`BizResult`]. Repositories
//! raise [`EntityError`] for lookup misses and constraint failures, the HTTP
//! extractors raise [`ValidationError`] and [`RequestError`], and storage
//! backends wrap anything else in [`StorageError`].
//!
//! The [`IntoResponse`] implementation on [`BizError`] is the single place
//! where an error becomes an HTTP response. The body always has the shape:
//!
//! ```json
//! { "error": { "message": "Not Found", "status": 404 }, "message": "Not Found" }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! async fn find(repo: &dyn CompanyRepository, code: &str) -> BizResult<CompanyDetail> {
//!     repo.get_by_code(code).await
//! }
//!
//! match find(repo, "apple").await {
//!     Err(BizError::Entity(EntityError::NotFound { .. })) => println!("no such company"),
//!     Err(e) => eprintln!("{} ({})", e, e.status_code()),
//!     Ok(company) => println!("{:?}", company),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for BizTime
///
/// Each variant wraps a more specific error category. Anything that is not
/// one of the structured categories ends up in `Storage` or `Internal` and is
/// reported as a server error.
#[derive(Debug, Error)]
pub enum BizError {
    /// Entity lookups and constraint failures
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Request body validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport-level rejections (bad JSON, bad path, unknown route)
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Relational store failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Programming errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Inner `error` object of the response envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

/// Error response envelope: `{error: {message, status}, message}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub message: String,
}

impl BizError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BizError::Entity(e) => e.status_code(),
            BizError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BizError::Request(e) => e.status_code(),
            BizError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BizError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error, used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            BizError::Entity(e) => e.error_code(),
            BizError::Validation(_) => "VALIDATION_ERROR",
            BizError::Request(e) => e.error_code(),
            BizError::Storage(_) => "STORAGE_ERROR",
            BizError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Shorthand for a missing entity
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        BizError::Entity(EntityError::NotFound {
            entity_type,
            key: key.to_string(),
        })
    }

    /// Convert to the response envelope
    pub fn to_response(&self) -> ErrorResponse {
        let message = self.to_string();
        ErrorResponse {
            error: ErrorBody {
                message: message.clone(),
                status: self.status_code().as_u16(),
            },
            message,
        }
    }
}

impl IntoResponse for BizError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug, Error)]
pub enum EntityError {
    /// No row matches the given key
    #[error("{entity_type} {key} does not exist")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    /// A unique constraint rejected the write
    #[error("{entity_type} {key} already exists")]
    Conflict {
        entity_type: &'static str,
        key: String,
    },

    /// A foreign key names a row that does not exist
    #[error("{entity_type} references unknown {referenced} {key}")]
    ReferentialViolation {
        entity_type: &'static str,
        referenced: &'static str,
        key: String,
    },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::Conflict { .. } => StatusCode::CONFLICT,
            EntityError::ReferentialViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::Conflict { .. } => "ENTITY_CONFLICT",
            EntityError::ReferentialViolation { .. } => "REFERENTIAL_VIOLATION",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to request body validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field was absent
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    /// A single field has an invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// Several fields failed
    #[error("Validation failed: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),
}

/// One failed field inside [`ValidationError::FieldErrors`]
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn format_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldValidationError {
                    field: field.to_string(),
                    message: match &err.message {
                        Some(message) => message.to_string(),
                        None if err.code == "required" => "is required".to_string(),
                        None => err.code.to_string(),
                    },
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        if fields.len() == 1 {
            let only = fields.remove(0);
            if only.message == "is required" {
                return ValidationError::MissingField { field: only.field };
            }
            return ValidationError::InvalidField {
                field: only.field,
                message: only.message,
            };
        }
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for BizError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BizError::Validation(errors.into())
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors produced before a request reaches a handler body
#[derive(Debug, Error)]
pub enum RequestError {
    /// Body is not valid JSON or has the wrong shape
    #[error("Invalid JSON body: {message}")]
    InvalidJson { message: String },

    /// Path parameter could not be parsed
    #[error("Invalid path parameter '{value}': {message}")]
    InvalidPath { value: String, message: String },

    /// No route matched the request
    #[error("Not Found")]
    RouteNotFound,
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            RequestError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidJson { .. } => "INVALID_JSON",
            RequestError::InvalidPath { .. } => "INVALID_PATH",
            RequestError::RouteNotFound => "ROUTE_NOT_FOUND",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the relational store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error
    #[error("Failed to connect to {backend}: {message}")]
    Connection {
        backend: &'static str,
        message: String,
    },

    /// Query execution error
    #[error("{backend} query error: {message}")]
    Query {
        backend: &'static str,
        message: String,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    Transaction { message: String },
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for BizTime operations
pub type BizResult<T> = Result<T, BizError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_not_found_display_and_status() {
        let err = BizError::not_found("Invoice", 999);
        assert_eq!(err.to_string(), "Invoice 999 does not exist");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
    }

    #[test]
    fn test_entity_error_status_codes() {
        let conflict = EntityError::Conflict {
            entity_type: "Company",
            key: "apple".to_string(),
        };
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let fk = EntityError::ReferentialViolation {
            entity_type: "Invoice",
            referenced: "Company",
            key: "nope".to_string(),
        };
        assert_eq!(fk.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(fk.to_string().contains("nope"));
    }

    #[test]
    fn test_route_not_found_envelope() {
        let err = BizError::from(RequestError::RouteNotFound);
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": { "message": "Not Found", "status": 404 },
                "message": "Not Found"
            })
        );
    }

    #[test]
    fn test_storage_error_is_server_error() {
        let err = BizError::from(StorageError::Query {
            backend: "PostgreSQL",
            message: "relation \"companies\" does not exist".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("PostgreSQL"));
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = BizError::not_found("Company", "ghost").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(required)]
        amt: Option<f64>,
        #[validate(required)]
        paid: Option<bool>,
    }

    #[test]
    fn test_single_missing_field_maps_to_missing_field() {
        let probe = Probe {
            amt: Some(1.0),
            paid: None,
        };
        let err: ValidationError = probe.validate().unwrap_err().into();
        assert!(matches!(err, ValidationError::MissingField { ref field } if field == "paid"));
    }

    #[test]
    fn test_several_missing_fields_are_listed() {
        let probe = Probe {
            amt: None,
            paid: None,
        };
        let err: ValidationError = probe.validate().unwrap_err().into();
        let display = err.to_string();
        assert!(display.contains("amt"));
        assert!(display.contains("paid"));
    }
}
