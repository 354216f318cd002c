use record_store_sdk::{CustomerRecord, RecordFields};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::store::{Collection, Document};

const ENTITY: &str = "Record";

/// Customer records keyed by national ID, with card-number lookups.
pub struct RecordRepository {
    records: Collection<CustomerRecord>,
}

impl RecordRepository {
    pub fn load(document: Document<CustomerRecord>) -> Self {
        Self {
            records: Collection::load(document),
        }
    }

    #[must_use]
    pub fn list_all(&self) -> Vec<CustomerRecord> {
        self.records.read(<[CustomerRecord]>::to_vec)
    }

    /// # Errors
    /// `Validation` when a required field is missing or empty, `Conflict`
    /// when the national ID is already taken, `Persistence` on write failure.
    #[instrument(skip_all)]
    pub fn create(&self, record: CustomerRecord) -> Result<CustomerRecord, DomainError> {
        validate_required(&record)?;
        let national_id = record.national_id().unwrap_or_default().to_owned();

        self.records.update(|records| {
            if records
                .iter()
                .any(|r| r.national_id() == Some(national_id.as_str()))
            {
                return Err(DomainError::conflict(
                    ENTITY,
                    RecordFields::NATIONAL_ID,
                    national_id.as_str(),
                ));
            }
            records.push(record.clone());
            Ok(())
        })?;

        info!(national_id = %national_id, "Record created");
        Ok(record)
    }

    /// # Errors
    /// `NotFound` when no record has this national ID.
    pub fn get_by_id(&self, national_id: &str) -> Result<CustomerRecord, DomainError> {
        self.records
            .read(|records| find_by_id(records, national_id).cloned())
            .ok_or_else(|| DomainError::not_found(ENTITY, national_id))
    }

    /// Merge `patch` onto the record and keep `nationalId` pinned to the key.
    ///
    /// # Errors
    /// `NotFound`, `Validation` if the merged record lost a required field,
    /// or `Persistence`.
    #[instrument(skip(self, patch))]
    pub fn replace_by_id(
        &self,
        national_id: &str,
        patch: Map<String, Value>,
    ) -> Result<CustomerRecord, DomainError> {
        let merged = self.records.update(|records| {
            let idx = records
                .iter()
                .position(|r| r.national_id() == Some(national_id))
                .ok_or_else(|| DomainError::not_found(ENTITY, national_id))?;

            let mut merged = records[idx].clone();
            merged.merge(patch);
            merged.set(RecordFields::NATIONAL_ID, national_id);
            validate_required(&merged)?;

            records[idx] = merged.clone();
            Ok(merged)
        })?;

        debug!("Record replaced by national ID");
        Ok(merged)
    }

    /// First record, in insertion order, holding this card number.
    ///
    /// # Errors
    /// `NotFound` when no record carries the card number.
    pub fn get_by_card_number(&self, card_number: &str) -> Result<CustomerRecord, DomainError> {
        self.records
            .read(|records| find_by_card(records, card_number).cloned())
            .ok_or_else(|| DomainError::not_found(ENTITY, card_number))
    }

    /// Merge `patch` onto the first record holding `card_number`.
    ///
    /// The card number is pinned to the key and the national ID to the
    /// record's existing value, so this path cannot break ID uniqueness.
    ///
    /// # Errors
    /// `NotFound`, `Validation` or `Persistence`.
    #[instrument(skip(self, patch))]
    pub fn replace_by_card_number(
        &self,
        card_number: &str,
        patch: Map<String, Value>,
    ) -> Result<CustomerRecord, DomainError> {
        let merged = self.records.update(|records| {
            let idx = position_by_card(records, card_number)
                .ok_or_else(|| DomainError::not_found(ENTITY, card_number))?;

            let existing_id = records[idx].get(RecordFields::NATIONAL_ID).cloned();
            let mut merged = records[idx].clone();
            merged.merge(patch);
            merged.set(RecordFields::CREDIT_CARD_NUMBER, card_number);
            match existing_id {
                Some(id) => merged.set(RecordFields::NATIONAL_ID, id),
                None => {
                    merged.remove(RecordFields::NATIONAL_ID);
                }
            }
            validate_fields(&merged, &[RecordFields::USERNAME, RecordFields::USER_ID])?;

            records[idx] = merged.clone();
            Ok(merged)
        })?;

        debug!("Record replaced by card number");
        Ok(merged)
    }

    /// # Errors
    /// `Validation` for an empty status, `NotFound`, or `Persistence`.
    #[instrument(skip(self))]
    pub fn set_status_by_card_number(
        &self,
        card_number: &str,
        status: &str,
    ) -> Result<CustomerRecord, DomainError> {
        if status.is_empty() {
            return Err(DomainError::validation(
                RecordFields::STATUS,
                "Status field is required",
            ));
        }

        let updated = self.records.update(|records| {
            let idx = position_by_card(records, card_number)
                .ok_or_else(|| DomainError::not_found(ENTITY, card_number))?;
            records[idx].set(RecordFields::STATUS, status);
            Ok(records[idx].clone())
        })?;

        info!(status, "Record status updated");
        Ok(updated)
    }

    /// Phone number of a record: `Ok(None)` when the record exists but has no
    /// phone (absent, null or empty string).
    ///
    /// # Errors
    /// `NotFound` when no record has this national ID.
    pub fn get_phone_by_id(&self, national_id: &str) -> Result<Option<Value>, DomainError> {
        let record = self.get_by_id(national_id)?;
        Ok(record
            .get(RecordFields::PHONE)
            .filter(|phone| !is_blank(phone))
            .cloned())
    }
}

fn find_by_id<'a>(records: &'a [CustomerRecord], national_id: &str) -> Option<&'a CustomerRecord> {
    records
        .iter()
        .find(|r| r.national_id() == Some(national_id))
}

fn find_by_card<'a>(
    records: &'a [CustomerRecord],
    card_number: &str,
) -> Option<&'a CustomerRecord> {
    records
        .iter()
        .find(|r| r.credit_card_number() == Some(card_number))
}

fn position_by_card(records: &[CustomerRecord], card_number: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| r.credit_card_number() == Some(card_number))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn validate_required(record: &CustomerRecord) -> Result<(), DomainError> {
    validate_fields(record, &RecordFields::REQUIRED)
}

/// Each field must be a non-empty JSON string.
fn validate_fields(record: &CustomerRecord, fields: &[&str]) -> Result<(), DomainError> {
    for &field in fields {
        match record.get(field) {
            Some(Value::String(s)) if !s.is_empty() => {}
            None | Some(Value::Null) => return Err(DomainError::required(field)),
            Some(Value::String(_)) => {
                return Err(DomainError::validation(
                    field,
                    format!("{field} must not be empty"),
                ));
            }
            Some(_) => {
                return Err(DomainError::validation(
                    field,
                    format!("{field} must be a string"),
                ));
            }
        }
    }
    Ok(())
}
