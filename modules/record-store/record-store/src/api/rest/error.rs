use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::error::DomainError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error response rendered as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Map domain error to an HTTP error response
pub fn domain_error_to_api_error(e: &DomainError) -> ApiError {
    match e {
        DomainError::NotFound { .. } => ApiError::not_found(e.to_string()),
        DomainError::Validation { message, .. } => ApiError::bad_request(message.as_str()),
        DomainError::Conflict { key, .. } => {
            tracing::debug!(key = %key, "Duplicate key rejected");
            ApiError::new(StatusCode::CONFLICT, e.to_string())
        }
        DomainError::IdsExhausted { entity } => {
            tracing::error!(entity = %entity, "Identifier space exhausted");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        DomainError::Persistence(source) => {
            tracing::error!(error = %source, "Persistence error occurred");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to persist data",
            )
        }
    }
}

/// Implement From<DomainError> for `ApiError` so `?` works in handlers
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        domain_error_to_api_error(&e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
