use async_trait::async_trait;
use record_store_sdk::{CustomerRecord, RecordStoreClient, RecordStoreError, Ticket};
use std::sync::Arc;

use crate::domain::records::RecordRepository;
use crate::domain::tickets::TicketRepository;

/// In-process [`RecordStoreClient`] backed by the module's repositories.
pub struct LocalClient {
    records: Arc<RecordRepository>,
    tickets: Arc<TicketRepository>,
}

impl LocalClient {
    #[must_use]
    pub fn new(records: Arc<RecordRepository>, tickets: Arc<TicketRepository>) -> Self {
        Self { records, tickets }
    }
}

#[async_trait]
impl RecordStoreClient for LocalClient {
    async fn get_record_by_card(
        &self,
        card_number: &str,
    ) -> Result<CustomerRecord, RecordStoreError> {
        self.records
            .get_by_card_number(card_number)
            .map_err(Into::into)
    }

    async fn create_ticket(&self, description: &str) -> Result<String, RecordStoreError> {
        self.tickets
            .create(description)
            .map(|ticket| ticket.id)
            .map_err(Into::into)
    }

    async fn get_ticket(&self, id: &str) -> Result<Ticket, RecordStoreError> {
        self.tickets.get_by_id(id).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::store::Document;
    use crate::infra::storage::InMemoryStore;
    use record_store_sdk::TicketStatus;
    use serde_json::json;

    fn client() -> (LocalClient, Arc<RecordRepository>) {
        let store = Arc::new(InMemoryStore::new());
        let records = Arc::new(RecordRepository::load(Document::new(
            store.clone(),
            "data.json",
        )));
        let tickets = Arc::new(TicketRepository::load(Document::new(store, "tickets.json")));
        (LocalClient::new(records.clone(), tickets), records)
    }

    #[tokio::test]
    async fn looks_up_records_by_card() {
        let (client, records) = client();
        let record = serde_json::from_value(json!({
            "nationalId": "S1",
            "username": "bob",
            "userId": "u-2",
            "creditCardNumber": "5500"
        }))
        .unwrap();
        records.create(record).unwrap();

        let found = client.get_record_by_card("5500").await.unwrap();
        assert_eq!(found.national_id(), Some("S1"));

        let err = client.get_record_by_card("0000").await.unwrap_err();
        assert!(matches!(err, RecordStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn opens_and_reads_tickets() {
        let (client, _) = client();
        let id = client.create_ticket("card declined").await.unwrap();

        let ticket = client.get_ticket(&id).await.unwrap();
        assert_eq!(ticket.description, "card declined");
        assert_eq!(ticket.status, TicketStatus::New);

        let err = client.create_ticket("").await.unwrap_err();
        assert_eq!(
            err,
            RecordStoreError::Validation("description is required".to_owned())
        );
    }
}
