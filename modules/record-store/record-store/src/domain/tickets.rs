use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use record_store_sdk::{Ticket, TicketStatus};
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::domain::store::{Collection, Document};

const ENTITY: &str = "Ticket";

/// Issues clock-derived ticket identifiers.
///
/// An id is the current Unix time in milliseconds, bumped past the last
/// issued id whenever the clock has not moved on, so ids stay numeric and
/// strictly increasing within a process.
pub struct TicketIdGenerator {
    last: AtomicU64,
}

impl TicketIdGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
        }
    }

    /// Seed from the largest numeric id among `tickets`.
    #[must_use]
    pub fn seeded_from(tickets: &[Ticket]) -> Self {
        let seed = tickets
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self::new(seed)
    }

    /// # Errors
    /// `IdsExhausted` once `u64::MAX` has been issued (or seeded).
    pub fn next_id(&self) -> Result<String, DomainError> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let floor = last
                .checked_add(1)
                .ok_or(DomainError::IdsExhausted { entity: ENTITY })?;
            let next = now.max(floor);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Ok(next.to_string()),
                Err(current) => last = current,
            }
        }
    }
}

/// Support tickets with a closed status lifecycle.
pub struct TicketRepository {
    tickets: Collection<Ticket>,
    ids: TicketIdGenerator,
}

impl TicketRepository {
    pub fn load(document: Document<Ticket>) -> Self {
        let tickets = Collection::load(document);
        let ids = tickets.read(TicketIdGenerator::seeded_from);
        Self { tickets, ids }
    }

    #[must_use]
    pub fn list(&self) -> Vec<Ticket> {
        self.tickets.read(<[Ticket]>::to_vec)
    }

    /// # Errors
    /// `Validation` for an empty description, `IdsExhausted` when no larger
    /// id exists, `Persistence` on write failure.
    #[instrument(skip_all)]
    pub fn create(&self, description: &str) -> Result<Ticket, DomainError> {
        if description.is_empty() {
            return Err(DomainError::required("description"));
        }

        let ticket = Ticket {
            id: self.ids.next_id()?,
            description: description.to_owned(),
            status: TicketStatus::New,
        };
        self.tickets.update(|tickets| {
            tickets.push(ticket.clone());
            Ok(())
        })?;

        info!(ticket_id = %ticket.id, "Ticket created");
        Ok(ticket)
    }

    /// # Errors
    /// `NotFound` when no ticket has this id.
    pub fn get_by_id(&self, id: &str) -> Result<Ticket, DomainError> {
        self.tickets
            .read(|tickets| tickets.iter().find(|t| t.id == id).cloned())
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// # Errors
    /// `NotFound` or `Persistence`.
    #[instrument(skip(self, status), fields(status = %status))]
    pub fn set_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, DomainError> {
        let updated = self.tickets.update(|tickets| {
            let ticket = tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
            ticket.status = status;
            Ok(ticket.clone())
        })?;

        info!("Ticket status updated");
        Ok(updated)
    }
}
