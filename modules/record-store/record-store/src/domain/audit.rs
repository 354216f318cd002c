use chrono::{DateTime, NaiveDate, Utc};
use record_store_sdk::{AuditEntry, AuditQuery};
use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::store::{Collection, Document};

/// Append-only log of inbound requests.
pub struct AuditLog {
    entries: Collection<AuditEntry>,
}

impl AuditLog {
    pub fn load(document: Document<AuditEntry>) -> Self {
        Self {
            entries: Collection::load(document),
        }
    }

    /// Record a request observed now.
    ///
    /// # Errors
    /// `Persistence` when the log cannot be written.
    pub fn record(&self, method: &str, url: &str) -> Result<AuditEntry, DomainError> {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            method: method.to_owned(),
            url: url.to_owned(),
        };
        info!(method = %entry.method, url = %entry.url, "Request received");
        self.append(entry.clone())?;
        Ok(entry)
    }

    /// # Errors
    /// `Persistence` when the log cannot be written.
    pub fn append(&self, entry: AuditEntry) -> Result<(), DomainError> {
        self.entries.update(|entries| {
            entries.push(entry);
            Ok(())
        })
    }

    /// Entries matching every filter present in `query`.
    ///
    /// Time bounds are inclusive. A bound that does not parse matches nothing.
    #[must_use]
    pub fn query(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        let Some(from) = parse_optional_bound(query.from.as_deref()) else {
            return Vec::new();
        };
        let Some(to) = parse_optional_bound(query.to.as_deref()) else {
            return Vec::new();
        };
        let method = query.method.as_deref().map(str::to_uppercase);

        self.entries.read(|entries| {
            entries
                .iter()
                .filter(|e| from.is_none_or(|from| e.timestamp >= from))
                .filter(|e| to.is_none_or(|to| e.timestamp <= to))
                .filter(|e| {
                    method
                        .as_deref()
                        .is_none_or(|m| e.method.to_uppercase() == m)
                })
                .cloned()
                .collect()
        })
    }
}

/// `Some(None)` when absent, `Some(Some(t))` when it parses, `None` otherwise.
fn parse_optional_bound(raw: Option<&str>) -> Option<Option<DateTime<Utc>>> {
    match raw {
        None => Some(None),
        Some(raw) => {
            let parsed = parse_bound(raw);
            if parsed.is_none() {
                debug!(bound = raw, "Unparsable audit time bound, nothing matches");
            }
            parsed.map(Some)
        }
    }
}

/// RFC 3339 timestamp, or `YYYY-MM-DD` taken as midnight UTC.
fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
