use record_store_sdk::{AuditQuery, CustomerRecord, Ticket};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the status update endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of the ticket creation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTicketRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStatusResponse {
    pub success: bool,
    pub updated_record: CustomerRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneResponse {
    pub phone: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketCreatedResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketStatusResponse {
    pub success: bool,
    pub ticket: Ticket,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Query string of `GET /api/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub method: Option<String>,
}

/// Empty parameters (`?method=`) are treated as absent.
impl From<LogsQuery> for AuditQuery {
    fn from(q: LogsQuery) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        AuditQuery {
            from: present(q.from),
            to: present(q.to),
            method: present(q.method),
        }
    }
}
