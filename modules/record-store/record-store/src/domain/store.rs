//! Document persistence port.
//!
//! Every collection lives in memory and is written back in full to a named
//! document after each mutation. [`DocumentStore`] is the seam to the backing
//! medium; [`Document`] adds typed (de)serialization with best-effort loading,
//! and [`Collection`] ties an in-memory vector to its document with
//! write-through-or-rollback semantics.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read document '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write document '{name}': {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode document '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw storage for named documents.
///
/// `load` returns `Ok(None)` when the document does not exist yet. `save`
/// replaces the whole document.
pub trait DocumentStore: Send + Sync {
    /// # Errors
    /// Returns [`StoreError::Read`] when the document exists but cannot be read.
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::Write`] when the document cannot be replaced.
    fn save(&self, name: &str, contents: &[u8]) -> Result<(), StoreError>;
}

/// A named JSON array of `T` in a [`DocumentStore`].
pub struct Document<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _items: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> Document<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _items: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load the document, falling back to an empty collection when it is
    /// missing, unreadable or does not decode. A single malformed entry
    /// fails the whole document.
    pub fn load_or_default(&self) -> Vec<T> {
        let bytes = match self.store.load(&self.name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!(document = %self.name, "Document not found, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(document = %self.name, error = %e, "Document unreadable, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(e) => {
                error!(
                    document = %self.name,
                    error = %e,
                    "Document could not be decoded; starting empty, the next write replaces its contents"
                );
                Vec::new()
            }
        }
    }

    /// Serialize `items` (pretty-printed) and replace the stored document.
    ///
    /// # Errors
    /// Returns [`StoreError`] if encoding or writing fails.
    pub fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Encode {
            name: self.name.clone(),
            source,
        })?;
        self.store.save(&self.name, &bytes)?;
        debug!(document = %self.name, count = items.len(), "Document saved");
        Ok(())
    }
}

/// In-memory ordered collection backed by a [`Document`].
///
/// A single lock covers validate, mutate and persist, so concurrent writers
/// to the same collection never interleave.
pub struct Collection<T> {
    document: Document<T>,
    items: Mutex<Vec<T>>,
}

impl<T: Clone + Serialize + DeserializeOwned> Collection<T> {
    pub fn load(document: Document<T>) -> Self {
        let items = document.load_or_default();
        info!(document = %document.name(), count = items.len(), "Collection loaded");
        Self {
            document,
            items: Mutex::new(items),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.lock())
    }

    /// Apply `f` to a working copy, persist it, and only then publish it.
    ///
    /// When `f` fails or the document cannot be saved the in-memory state is
    /// left exactly as it was.
    ///
    /// # Errors
    /// Returns the error produced by `f`, or [`DomainError::Persistence`].
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        let mut items = self.items.lock();
        let mut working = items.clone();
        let out = f(&mut working)?;
        self.document.save(&working)?;
        *items = working;
        Ok(out)
    }
}
