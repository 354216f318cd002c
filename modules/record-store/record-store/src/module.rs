//! Module declaration for the record store.

use std::sync::Arc;

use axum::Router;
use record_store_sdk::RecordStoreClient;
use tracing::{debug, info};

use crate::config::RecordStoreConfig;
use crate::domain::audit::AuditLog;
use crate::domain::records::RecordRepository;
use crate::domain::store::{Document, DocumentStore};
use crate::domain::tickets::TicketRepository;
use crate::local_client::LocalClient;

/// Record store module.
///
/// Owns the three collections (customer records, support tickets and the
/// request audit log), loads them once from a [`DocumentStore`] and exposes
/// them over REST and through an in-process [`RecordStoreClient`].
#[derive(Clone)]
pub struct RecordStoreModule {
    records: Arc<RecordRepository>,
    tickets: Arc<TicketRepository>,
    audit: Arc<AuditLog>,
}

impl RecordStoreModule {
    /// Key of this module's section under `modules` in the app config.
    pub const NAME: &'static str = "record_store";

    /// Load every collection from `store`.
    ///
    /// Missing or unreadable documents start out empty.
    pub fn init(store: Arc<dyn DocumentStore>, cfg: &RecordStoreConfig) -> Self {
        info!("Initializing record_store module");
        debug!(
            records = %cfg.records_file,
            tickets = %cfg.tickets_file,
            logs = %cfg.logs_file,
            "Loaded record_store config"
        );

        let records = Arc::new(RecordRepository::load(Document::new(
            store.clone(),
            cfg.records_file.as_str(),
        )));
        let tickets = Arc::new(TicketRepository::load(Document::new(
            store.clone(),
            cfg.tickets_file.as_str(),
        )));
        let audit = Arc::new(AuditLog::load(Document::new(store, cfg.logs_file.as_str())));

        info!("Record store module initialized");
        Self {
            records,
            tickets,
            audit,
        }
    }

    /// REST surface with JSON 404 and 405 fallbacks.
    ///
    /// Not audited on its own; wrap it with [`Self::audit_layer`] once any
    /// host layers that may reject requests are in place.
    #[must_use]
    pub fn router(&self) -> Router {
        info!("Registering record_store REST routes");
        crate::api::rest::routes::register_routes(
            Router::new(),
            self.records.clone(),
            self.tickets.clone(),
            self.audit.clone(),
        )
    }

    /// Record every request reaching `router` in this module's audit log.
    #[must_use]
    pub fn audit_layer(&self, router: Router) -> Router {
        crate::api::rest::routes::audit_layer(router, self.audit.clone())
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn RecordStoreClient> {
        Arc::new(LocalClient::new(self.records.clone(), self.tickets.clone()))
    }

    #[must_use]
    pub fn records(&self) -> &Arc<RecordRepository> {
        &self.records
    }

    #[must_use]
    pub fn tickets(&self) -> &Arc<TicketRepository> {
        &self.tickets
    }

    #[must_use]
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }
}
