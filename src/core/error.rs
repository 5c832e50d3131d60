//! Typed errors for relation resolution
//!
//! Resolver code surfaces [`RelationError`] so callers can match on the
//! failure kind. Failures coming out of a [`QueryService`] are carried in
//! [`RelationError::Service`] with their message untouched.
//!
//! [`QueryService`]: crate::core::service::QueryService

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building or resolving relation fields
#[derive(Debug, Error)]
pub enum RelationError {
    /// A DTO type was referenced but never registered with the schema
    #[error("Unknown DTO type: {0}")]
    UnknownDto(String),

    /// A resolver was asked for a relation field it does not expose
    #[error("Unknown relation '{field}' on {host}")]
    UnknownRelation { host: String, field: String },

    /// No query service is registered for the host DTO
    #[error("No query service registered for {0}")]
    UnknownService(String),

    /// A paging cursor could not be decoded
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// A guard refused access to the field
    #[error("Forbidden resource: {field}")]
    Forbidden { field: String },

    /// Query arguments could not be read
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The query service failed; the message is the service's own
    #[error("{0}")]
    Service(#[source] anyhow::Error),

    /// The GraphQL schema could not be assembled
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl RelationError {
    /// Stable code exposed in GraphQL error extensions and HTTP bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            RelationError::UnknownDto(_) => "UNKNOWN_DTO",
            RelationError::UnknownRelation { .. } => "UNKNOWN_RELATION",
            RelationError::UnknownService(_) => "UNKNOWN_SERVICE",
            RelationError::InvalidCursor(_) => "INVALID_CURSOR",
            RelationError::Forbidden { .. } => "FORBIDDEN",
            RelationError::InvalidArguments(_) => "INVALID_ARGUMENTS",
            RelationError::Service(_) => "SERVICE_ERROR",
            RelationError::Schema(_) => "SCHEMA_ERROR",
        }
    }

    /// HTTP status used when the error escapes a handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelationError::InvalidCursor(_) | RelationError::InvalidArguments(_) => {
                StatusCode::BAD_REQUEST
            }
            RelationError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RelationError::UnknownRelation { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for RelationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for RelationError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RelationError>() {
            Ok(relation_error) => relation_error,
            Err(other) => RelationError::Service(other),
        }
    }
}

impl From<serde_json::Error> for RelationError {
    fn from(err: serde_json::Error) -> Self {
        RelationError::InvalidArguments(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_keeps_message() {
        let err = RelationError::from(anyhow::anyhow!("relation lookup failed"));
        assert_eq!(err.to_string(), "relation lookup failed");
        assert_eq!(err.error_code(), "SERVICE_ERROR");
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_variant() {
        let original = anyhow::Error::new(RelationError::InvalidCursor("abc".into()));
        let err = RelationError::from(original);
        assert!(matches!(err, RelationError::InvalidCursor(ref c) if c == "abc"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelationError::InvalidCursor("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelationError::Forbidden {
                field: "relation".into()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RelationError::UnknownDto("Foo".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let err = RelationError::UnknownRelation {
            host: "TestResolverDTO".into(),
            field: "missing".into(),
        };
        let json = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(json["code"], "UNKNOWN_RELATION");
        assert_eq!(json["message"], "Unknown relation 'missing' on TestResolverDTO");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: RelationError = json_err.into();
        assert_eq!(err.error_code(), "INVALID_ARGUMENTS");
    }
}
