//! Structured API errors
//!
//! Every endpoint failure serializes to `{"error": {"code", "message"}}`
//! with a matching HTTP status - never a bare transport error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use vetrina::DomainError;

/// Wire format of an API failure
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable explanation
    pub message: String,
}

/// API error carrying the HTTP status it maps to
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let (status, code) = match &err {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::SyncInProgress => (StatusCode::CONFLICT, "sync_in_progress"),
            DomainError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
            DomainError::EmbeddingProvider(_) => (StatusCode::BAD_GATEWAY, "embedding_provider"),
            DomainError::Catalog(_) => (StatusCode::BAD_GATEWAY, "catalog"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::validation("empty query"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Product", 42), StatusCode::NOT_FOUND),
            (DomainError::SyncInProgress, StatusCode::CONFLICT),
            (
                DomainError::StoreUnavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DomainError::EmbeddingProvider("429".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }
}
