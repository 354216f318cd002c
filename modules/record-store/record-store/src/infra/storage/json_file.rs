use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::store::{DocumentStore, StoreError};

/// Documents stored as files in a single data directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers never observe a half-written document.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// # Errors
    /// Returns an I/O error if the data directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn write_atomic(&self, name: &str, contents: &[u8]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(name)).map_err(|e| e.error)?;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                name: name.to_owned(),
                source,
            }),
        }
    }

    fn save(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        self.write_atomic(name, contents)
            .map_err(|source| StoreError::Write {
                name: name.to_owned(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use record_store_sdk::Ticket;
    use tempfile::tempdir;

    use crate::domain::store::Document;

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        assert!(store.load("data.json").unwrap().is_none());
    }

    #[test]
    fn creates_nested_data_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = JsonFileStore::new(&nested).unwrap();
        store.save("data.json", b"[]").unwrap();
        assert!(nested.join("data.json").is_file());
    }

    #[test]
    fn save_overwrites_whole_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.save("data.json", b"[1, 2, 3, 4, 5]").unwrap();
        store.save("data.json", b"[]").unwrap();
        assert_eq!(store.load("data.json").unwrap().unwrap(), b"[]");
    }

    #[test]
    fn save_into_removed_dir_is_write_error() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = JsonFileStore::new(&data_dir).unwrap();
        fs::remove_dir_all(&data_dir).unwrap();

        let err = store.save("data.json", b"[]").unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn unreadable_path_is_read_error() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        fs::create_dir(dir.path().join("data.json")).unwrap();

        let err = store.load("data.json").unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[test]
    fn typed_document_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(JsonFileStore::new(dir.path()).unwrap());
        let doc: Document<Ticket> = Document::new(store.clone(), "tickets.json");

        let tickets: Vec<Ticket> = serde_json::from_str(
            r#"[
                {"id": "1", "description": "printer broken", "status": "New"},
                {"id": "2", "description": "vpn down", "status": "In Progress"}
            ]"#,
        )
        .unwrap();
        doc.save(&tickets).unwrap();

        let reloaded: Document<Ticket> = Document::new(store, "tickets.json");
        assert_eq!(reloaded.load_or_default(), tickets);

        let text = fs::read_to_string(dir.path().join("tickets.json")).unwrap();
        assert!(text.contains("\"In Progress\""));
    }
}
