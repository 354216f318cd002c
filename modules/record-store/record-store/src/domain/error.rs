use record_store_sdk::RecordStoreError;
use thiserror::Error;

use crate::domain::store::StoreError;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{entity} with this {field} already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        key: String,
    },

    #[error("no {entity} identifiers left to issue")]
    IdsExhausted { entity: &'static str },

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Required field is absent or empty.
    pub fn required(field: &str) -> Self {
        Self::validation(field, format!("{field} is required"))
    }

    pub fn conflict(entity: &'static str, field: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            field,
            key: key.into(),
        }
    }
}

impl From<DomainError> for RecordStoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
            DomainError::Validation { message, .. } => Self::Validation(message),
            DomainError::Conflict { .. } => Self::Conflict(e.to_string()),
            DomainError::IdsExhausted { .. } => Self::Internal(e.to_string()),
            DomainError::Persistence(source) => Self::Internal(source.to_string()),
        }
    }
}
