//! Object-safe client boundary for the record store.
//!
//! This is the surface used by protocol-bridge adapters: they look customers
//! up by card number and open support tickets on their behalf.

use async_trait::async_trait;

use crate::errors::RecordStoreError;
use crate::models::{CustomerRecord, Ticket};

#[async_trait]
pub trait RecordStoreClient: Send + Sync {
    /// Get the first customer record holding the given credit-card number.
    async fn get_record_by_card(&self, card_number: &str)
    -> Result<CustomerRecord, RecordStoreError>;

    /// Open a support ticket and return its identifier.
    async fn create_ticket(&self, description: &str) -> Result<String, RecordStoreError>;

    /// Get a support ticket by identifier.
    async fn get_ticket(&self, id: &str) -> Result<Ticket, RecordStoreError>;
}
