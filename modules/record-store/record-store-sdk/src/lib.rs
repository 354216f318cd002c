//! Record Store SDK
//!
//! Transport-agnostic models, the public error type and the client trait
//! consumed by adapters that talk to the record store.

pub mod client;
pub mod errors;
pub mod models;

pub use client::RecordStoreClient;
pub use errors::RecordStoreError;
pub use models::{AuditEntry, AuditQuery, CustomerRecord, RecordFields, Ticket, TicketStatus};
