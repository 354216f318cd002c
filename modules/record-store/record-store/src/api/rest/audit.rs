use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use crate::domain::audit::AuditLog;

/// Record every request in the audit log before it is dispatched.
///
/// The append is synchronous: if the log cannot be persisted the request is
/// answered with 500 and never reaches its handler.
pub async fn audit_middleware(audit: Arc<AuditLog>, req: Request, next: Next) -> Response {
    let url = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path(), |pq| pq.as_str())
        .to_owned();

    if let Err(e) = audit.record(req.method().as_str(), &url) {
        return ApiError::from(e).into_response();
    }

    next.run(req).await
}
