use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::domain::store::{DocumentStore, StoreError};

/// Volatile document store used by `--mock` runs and tests.
///
/// Writes can be switched to fail, for every document or for selected ones,
/// to exercise persistence error handling.
#[derive(Default)]
pub struct InMemoryStore {
    documents: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with raw contents.
    pub fn put(&self, name: &str, contents: &[u8]) {
        self.documents
            .lock()
            .insert(name.to_owned(), contents.to_vec());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.documents.lock().get(name).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes to `name` alone fail (or succeed again).
    pub fn fail_writes_for(&self, name: &str, fail: bool) {
        let mut failing = self.failing.lock();
        if fail {
            failing.insert(name.to_owned());
        } else {
            failing.remove(name);
        }
    }

    fn rejects(&self, name: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst) || self.failing.lock().contains(name)
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.get(name))
    }

    fn save(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        if self.rejects(name) {
            return Err(StoreError::Write {
                name: name.to_owned(),
                source: io::Error::other("writes disabled"),
            });
        }
        self.put(name, contents);
        Ok(())
    }
}
