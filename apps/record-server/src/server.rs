//! HTTP surface: module routes, health probe and the middleware stack.

use std::time::Duration;

use anyhow::{Context as _, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use record_bootstrap::{ServerConfig, shutdown_signal};
use record_store::RecordStoreModule;
use serde_json::{Value, json};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

const REQUEST_ID_HEADER: &str = "x-request-id";

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Full application router.
///
/// The audit layer wraps the body limit and timeout so rejected requests are
/// still recorded. `/health` is merged beside it, so probes do not grow the
/// audit log.
pub fn build_router(module: &RecordStoreModule, cfg: &ServerConfig) -> Router {
    let api = apply_request_limits(module.router(), cfg);
    let router = Router::new()
        .route("/health", get(health))
        .merge(module.audit_layer(api));
    apply_middleware_stack(router)
}

/// Body limit (innermost), then timeout.
fn apply_request_limits(mut router: Router, cfg: &ServerConfig) -> Router {
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
    router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));
    router.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(cfg.request_timeout_secs),
    ))
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &Response<axum::body::Body>, latency: Duration, span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                    tracing::debug!(parent: span, "Response sent");
                },
            ),
    )
}

/// Layers are registered innermost first. At runtime a request passes
/// `SetRequestId` → `PropagateRequestId` → Trace → audit → Timeout →
/// `BodyLimit` → routes.
fn apply_middleware_stack(mut router: Router) -> Router {
    // Trace
    router = apply_trace_layer(router);

    // Request id: propagate to the response, then set it (outermost).
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(header.clone()));
    router.layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}

/// Bind the listener and serve until a shutdown signal arrives.
///
/// # Errors
/// Fails when the address cannot be bound or the server stops abnormally.
pub async fn serve(router: Router, cfg: &ServerConfig) -> Result<()> {
    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "Record server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated abnormally")?;

    tracing::info!("Record server stopped");
    Ok(())
}
