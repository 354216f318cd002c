pub mod audit;
pub mod error;
pub mod records;
pub mod store;
pub mod tickets;

pub use audit::AuditLog;
pub use error::DomainError;
pub use records::RecordRepository;
pub use store::{Collection, Document, DocumentStore, StoreError};
pub use tickets::{TicketIdGenerator, TicketRepository};
