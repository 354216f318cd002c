use thiserror::Error;

/// Errors surfaced to record store clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordStoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}
