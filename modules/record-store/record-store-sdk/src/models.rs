//! Public models for the record store.
//!
//! A customer record has no fixed schema: it is a JSON object with a handful
//! of well-known fields (see [`RecordFields`]) and any number of opaque extras
//! that are stored and returned untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known customer record field names.
pub struct RecordFields;

impl RecordFields {
    pub const NATIONAL_ID: &'static str = "nationalId";
    pub const USERNAME: &'static str = "username";
    pub const USER_ID: &'static str = "userId";
    pub const CREDIT_CARD_NUMBER: &'static str = "creditCardNumber";
    pub const STATUS: &'static str = "status";
    pub const PHONE: &'static str = "phone";

    /// Fields that must hold a non-empty string on every stored record.
    pub const REQUIRED: [&'static str; 3] = [Self::NATIONAL_ID, Self::USERNAME, Self::USER_ID];
}

/// Customer record: an ordered JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRecord(Map<String, Value>);

impl CustomerRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the field as a string slice when it holds a JSON string.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_owned(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    #[must_use]
    pub fn national_id(&self) -> Option<&str> {
        self.text(RecordFields::NATIONAL_ID)
    }

    #[must_use]
    pub fn credit_card_number(&self) -> Option<&str> {
        self.text(RecordFields::CREDIT_CARD_NUMBER)
    }

    /// Overlay `patch` onto this record. Keys absent from the patch keep
    /// their current value; new keys are appended in patch order.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for CustomerRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Lifecycle status of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [Self::New, Self::InProgress, Self::Resolved];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the ticket statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ticket status '{0}'")]
pub struct InvalidTicketStatus(pub String);

impl FromStr for TicketStatus {
    type Err = InvalidTicketStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidTicketStatus(s.to_owned()))
    }
}

/// Support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub description: String,
    pub status: TicketStatus,
}

/// One inbound request as seen by the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
}

/// Audit log filters. All filters are optional and applied conjunctively.
///
/// `from`/`to` are kept as raw strings; they accept RFC 3339 timestamps or
/// `YYYY-MM-DD` dates and are parsed by the audit log itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub method: Option<String>,
}
