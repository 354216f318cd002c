use std::sync::Arc;

use axum::routing::{get, put};
use axum::{Extension, Router, middleware};

use crate::api::rest::audit::audit_middleware;
use crate::api::rest::handlers;
use crate::domain::audit::AuditLog;
use crate::domain::records::RecordRepository;
use crate::domain::tickets::TicketRepository;

/// Mount the record store endpoints on `router`.
///
/// Unmatched paths and unsupported methods answer with JSON errors. Auditing
/// is applied separately by [`audit_layer`] so the host can place it outside
/// its own limits.
pub fn register_routes(
    mut router: Router,
    records: Arc<RecordRepository>,
    tickets: Arc<TicketRepository>,
    audit: Arc<AuditLog>,
) -> Router {
    router = router
        .route(
            "/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/records/{national_id}",
            get(handlers::get_record).put(handlers::replace_record),
        )
        .route(
            "/api/data",
            get(handlers::list_records).post(handlers::create_record_legacy),
        )
        .route(
            "/api/data/card/{card_number}",
            get(handlers::get_record_by_card).put(handlers::replace_record_by_card),
        )
        .route(
            "/api/data/card/{card_number}/status",
            put(handlers::set_card_status),
        )
        .route("/api/phone/{national_id}", get(handlers::get_phone));

    router = router
        .route(
            "/api/tickets",
            get(handlers::list_tickets).post(handlers::create_ticket),
        )
        .route("/api/tickets/{id}", get(handlers::get_ticket))
        .route("/api/tickets/{id}/status", put(handlers::set_ticket_status));

    // Must follow every route: it only reaches already registered ones.
    router = router
        .route("/api/logs", get(handlers::list_logs))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found);

    router
        .layer(Extension(records))
        .layer(Extension(tickets))
        .layer(Extension(audit))
}

/// Append every request reaching `router` to the audit log before it is
/// dispatched, whatever the outcome.
pub fn audit_layer(router: Router, audit: Arc<AuditLog>) -> Router {
    router.layer(middleware::from_fn(
        move |req: axum::extract::Request, next: axum::middleware::Next| {
            let log = audit.clone();
            audit_middleware(log, req, next)
        },
    ))
}
