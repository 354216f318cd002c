use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use record_store_sdk::{AuditEntry, CustomerRecord, Ticket, TicketStatus};
use serde_json::{Map, Value};

use super::dto::{
    CardStatusResponse, CreateTicketRequest, LogsQuery, PhoneResponse, StatusRequest,
    SuccessResponse, TicketCreatedResponse, TicketStatusResponse,
};
use super::error::{ApiError, ApiResult};
use super::extract::{JsonBody, PathParam, QueryParams};
use crate::domain::audit::AuditLog;
use crate::domain::records::RecordRepository;
use crate::domain::tickets::TicketRepository;

fn valid_statuses() -> String {
    TicketStatus::ALL
        .into_iter()
        .map(TicketStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---- customer records ----

pub async fn list_records(
    Extension(records): Extension<Arc<RecordRepository>>,
) -> Json<Vec<CustomerRecord>> {
    Json(records.list_all())
}

pub async fn create_record(
    Extension(records): Extension<Arc<RecordRepository>>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> ApiResult<(StatusCode, Json<CustomerRecord>)> {
    let created = records.create(fields.into())?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_record(
    Extension(records): Extension<Arc<RecordRepository>>,
    PathParam(national_id): PathParam<String>,
) -> ApiResult<Json<CustomerRecord>> {
    Ok(Json(records.get_by_id(&national_id)?))
}

pub async fn replace_record(
    Extension(records): Extension<Arc<RecordRepository>>,
    PathParam(national_id): PathParam<String>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<CustomerRecord>> {
    Ok(Json(records.replace_by_id(&national_id, patch)?))
}

pub async fn get_record_by_card(
    Extension(records): Extension<Arc<RecordRepository>>,
    PathParam(card_number): PathParam<String>,
) -> ApiResult<Json<CustomerRecord>> {
    Ok(Json(records.get_by_card_number(&card_number)?))
}

pub async fn replace_record_by_card(
    Extension(records): Extension<Arc<RecordRepository>>,
    PathParam(card_number): PathParam<String>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<CustomerRecord>> {
    Ok(Json(records.replace_by_card_number(&card_number, patch)?))
}

pub async fn set_card_status(
    Extension(records): Extension<Arc<RecordRepository>>,
    PathParam(card_number): PathParam<String>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> ApiResult<Json<CardStatusResponse>> {
    let status = req.status.unwrap_or_default();
    let updated = records.set_status_by_card_number(&card_number, &status)?;
    Ok(Json(CardStatusResponse {
        success: true,
        updated_record: updated,
    }))
}

pub async fn get_phone(
    Extension(records): Extension<Arc<RecordRepository>>,
    PathParam(national_id): PathParam<String>,
) -> ApiResult<Json<PhoneResponse>> {
    let phone = records.get_phone_by_id(&national_id)?;
    Ok(Json(PhoneResponse { phone }))
}

/// Create endpoint of the earlier `/api/data` surface: same rules as
/// `POST /records`, but answers `{"success": true}`.
pub async fn create_record_legacy(
    Extension(records): Extension<Arc<RecordRepository>>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<SuccessResponse>> {
    records.create(fields.into())?;
    Ok(Json(SuccessResponse { success: true }))
}

// ---- support tickets ----

pub async fn list_tickets(
    Extension(tickets): Extension<Arc<TicketRepository>>,
) -> Json<Vec<Ticket>> {
    Json(tickets.list())
}

pub async fn create_ticket(
    Extension(tickets): Extension<Arc<TicketRepository>>,
    JsonBody(req): JsonBody<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketCreatedResponse>)> {
    let description = req.description.unwrap_or_default();
    let ticket = tickets.create(&description)?;
    Ok((
        StatusCode::CREATED,
        Json(TicketCreatedResponse { id: ticket.id }),
    ))
}

pub async fn get_ticket(
    Extension(tickets): Extension<Arc<TicketRepository>>,
    PathParam(id): PathParam<String>,
) -> ApiResult<Json<Ticket>> {
    Ok(Json(tickets.get_by_id(&id)?))
}

pub async fn set_ticket_status(
    Extension(tickets): Extension<Arc<TicketRepository>>,
    PathParam(id): PathParam<String>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> ApiResult<Json<TicketStatusResponse>> {
    let status: TicketStatus = req
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Invalid status. Must be one of: {}",
                valid_statuses()
            ))
        })?;
    let ticket = tickets.set_status(&id, status)?;
    Ok(Json(TicketStatusResponse {
        success: true,
        ticket,
    }))
}

// ---- audit log ----

pub async fn list_logs(
    Extension(audit): Extension<Arc<AuditLog>>,
    QueryParams(query): QueryParams<LogsQuery>,
) -> Json<Vec<AuditEntry>> {
    Json(audit.query(&query.into()))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::routes::{audit_layer, register_routes};
    use crate::domain::store::{Document, DocumentStore};
    use crate::infra::storage::InMemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt as _;

    struct TestApp {
        store: Arc<InMemoryStore>,
        router: Router,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let dyn_store: Arc<dyn DocumentStore> = store.clone();
            let records = Arc::new(RecordRepository::load(Document::new(
                dyn_store.clone(),
                "data.json",
            )));
            let tickets = Arc::new(TicketRepository::load(Document::new(
                dyn_store.clone(),
                "tickets.json",
            )));
            let audit = Arc::new(AuditLog::load(Document::new(dyn_store, "logs.json")));
            let router = register_routes(Router::new(), records, tickets, audit.clone());
            let router = audit_layer(router, audit);
            Self { store, router }
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }

    fn alice() -> Value {
        json!({
            "nationalId": "S1234567A",
            "username": "alice",
            "userId": "u-1",
            "creditCardNumber": "4111111111111111"
        })
    }

    #[tokio::test]
    async fn create_then_duplicate_returns_conflict() {
        let app = TestApp::new();

        let (status, body) = app.send("POST", "/records", Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, alice());

        let (status, body) = app.send("POST", "/records", Some(alice())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        let (status, body) = app.send("GET", "/records", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([alice()]));
    }

    #[tokio::test]
    async fn create_missing_username_is_bad_request() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                "POST",
                "/records",
                Some(json!({"nationalId": "S1", "userId": "u"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "username is required");

        let (_, body) = app.send("GET", "/records", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_with_error_body() {
        let app = TestApp::new();
        let request = Request::builder()
            .method("POST")
            .uri("/records")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = app.send("POST", "/records", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn partial_put_keeps_fields_and_pins_id() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;

        let (status, body) = app
            .send(
                "PUT",
                "/records/S1234567A",
                Some(json!({"nationalId": "OTHER", "phone": "999"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nationalId"], "S1234567A");
        assert_eq!(body["username"], "alice");
        assert_eq!(body["phone"], "999");

        let (status, fetched) = app.send("GET", "/records/S1234567A", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, body);

        let (status, _) = app
            .send("PUT", "/records/S1234567A", Some(json!({"userId": ""})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send("PUT", "/records/missing", Some(json!({"username": "x"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn card_status_scenario() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;

        let (status, body) = app
            .send(
                "PUT",
                "/api/data/card/4111111111111111/status",
                Some(json!({"status": "frozen"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["updatedRecord"]["status"], "frozen");
        assert_eq!(body["updatedRecord"]["nationalId"], "S1234567A");

        let (status, _) = app
            .send(
                "PUT",
                "/api/data/card/5500000000000004/status",
                Some(json!({"status": "frozen"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .send("PUT", "/api/data/card/4111111111111111/status", Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Status field is required");
    }

    #[tokio::test]
    async fn card_lookup_and_replace() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;

        let (status, body) = app
            .send("GET", "/api/data/card/4111111111111111", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, alice());

        let (status, body) = app
            .send(
                "PUT",
                "/api/data/card/4111111111111111",
                Some(json!({"creditCardNumber": "0000", "tier": "gold"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["creditCardNumber"], "4111111111111111");
        assert_eq!(body["tier"], "gold");

        let (status, _) = app.send("GET", "/api/data/card/0000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn phone_lookup_returns_null_when_absent() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;

        let (status, body) = app.send("GET", "/api/phone/S1234567A", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"phone": null}));

        let (status, _) = app.send("GET", "/api/phone/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ticket_scenario() {
        let app = TestApp::new();

        let (status, body) = app
            .send(
                "POST",
                "/api/tickets",
                Some(json!({"description": "printer broken"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_owned();
        assert!(id.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(body, json!({ "id": id }));

        let (status, ticket) = app.send("GET", &format!("/api/tickets/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            ticket,
            json!({"id": id, "description": "printer broken", "status": "New"})
        );

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/tickets/{id}/status"),
                Some(json!({"status": "In Progress"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["ticket"]["status"], "In Progress");
    }

    #[tokio::test]
    async fn invalid_ticket_status_leaves_ticket_unchanged() {
        let app = TestApp::new();
        let (_, body) = app
            .send("POST", "/api/tickets", Some(json!({"description": "x"})))
            .await;
        let id = body["id"].as_str().unwrap().to_owned();

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/tickets/{id}/status"),
                Some(json!({"status": "Closed"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("In Progress"));

        let (_, ticket) = app.send("GET", &format!("/api/tickets/{id}"), None).await;
        assert_eq!(ticket["status"], "New");

        let (status, _) = app
            .send(
                "PUT",
                "/api/tickets/42/status",
                Some(json!({"status": "Resolved"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ticket_without_description_is_bad_request() {
        let app = TestApp::new();
        let (status, _) = app.send("POST", "/api/tickets", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = app
            .send("POST", "/api/tickets", Some(json!({"description": ""})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.send("GET", "/api/tickets", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn every_request_is_audited_and_filterable() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;
        app.send("POST", "/records", Some(alice())).await;
        app.send("GET", "/records/nobody", None).await;
        app.send("GET", "/no/such/route", None).await;

        let (status, body) = app.send("GET", "/api/logs?method=post", None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e["method"] == "POST"));

        let (_, body) = app.send("GET", "/api/logs", None).await;
        let urls: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["url"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(
            urls,
            [
                "/records",
                "/records",
                "/records/nobody",
                "/no/such/route",
                "/api/logs?method=post",
                "/api/logs"
            ]
        );
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn legacy_data_endpoints_share_record_rules() {
        let app = TestApp::new();

        let (status, body) = app.send("POST", "/api/data", Some(alice())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, _) = app.send("POST", "/api/data", Some(alice())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app.send("GET", "/api/data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([alice()]));
    }

    #[tokio::test]
    async fn audit_failure_refuses_request_before_dispatch() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;

        app.store.fail_writes_for("logs.json", true);
        let (status, body) = app
            .send("PUT", "/records/S1234567A", Some(json!({"username": "mallory"})))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());

        app.store.fail_writes_for("logs.json", false);
        let (_, body) = app.send("GET", "/records/S1234567A", None).await;
        assert_eq!(body["username"], "alice");
    }

    #[tokio::test]
    async fn record_save_failure_is_internal_error_and_rolled_back() {
        let app = TestApp::new();
        app.send("POST", "/records", Some(alice())).await;
        let (_, logs_before) = app.send("GET", "/api/logs", None).await;
        let audited_before = logs_before.as_array().unwrap().len();

        app.store.fail_writes_for("data.json", true);
        let (status, body) = app
            .send("PUT", "/records/S1234567A", Some(json!({"username": "mallory"})))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to persist data");

        let (status, _) = app
            .send(
                "PUT",
                "/api/data/card/4111111111111111/status",
                Some(json!({"status": "blocked"})),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = app
            .send("POST", "/records", Some(json!({"nationalId": "S2", "username": "bob", "userId": "u-2"})))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        app.store.fail_writes_for("data.json", false);
        let (_, body) = app.send("GET", "/records", None).await;
        assert_eq!(body, json!([alice()]));

        // Every failed request still reached the audit log.
        let (_, logs_after) = app.send("GET", "/api/logs", None).await;
        assert_eq!(logs_after.as_array().unwrap().len(), audited_before + 5);
    }

    #[tokio::test]
    async fn ticket_save_failure_is_internal_error_and_rolled_back() {
        let app = TestApp::new();
        let (_, created) = app
            .send("POST", "/api/tickets", Some(json!({"description": "vpn down"})))
            .await;
        let id = created["id"].as_str().unwrap().to_owned();

        app.store.fail_writes_for("tickets.json", true);
        let (status, body) = app
            .send("POST", "/api/tickets", Some(json!({"description": "printer"})))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());

        let (status, _) = app
            .send(
                "PUT",
                &format!("/api/tickets/{id}/status"),
                Some(json!({"status": "Resolved"})),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        app.store.fail_writes_for("tickets.json", false);
        let (_, body) = app.send("GET", "/api/tickets", None).await;
        let tickets = body.as_array().unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0]["status"], "New");
    }

    #[tokio::test]
    async fn unsupported_method_is_json_method_not_allowed() {
        let app = TestApp::new();
        let (status, body) = app.send("DELETE", "/records", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");

        let (_, logs) = app.send("GET", "/api/logs?method=delete", None).await;
        assert_eq!(logs.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_path_is_json_bad_request() {
        let app = TestApp::new();
        let (status, body) = app.send("GET", "/records/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
