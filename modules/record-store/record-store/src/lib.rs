//! Record Store Module Implementation
//!
//! The public API is defined in `record-store-sdk` and re-exported here.

pub use record_store_sdk::{
    AuditEntry, AuditQuery, CustomerRecord, RecordFields, RecordStoreClient, RecordStoreError,
    Ticket, TicketStatus,
};

pub mod module;
pub use module::RecordStoreModule;

pub mod local_client;

pub mod config;
pub use config::RecordStoreConfig;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

pub use domain::{DocumentStore, StoreError};
pub use infra::storage::{InMemoryStore, JsonFileStore};
