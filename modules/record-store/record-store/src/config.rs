use serde::{Deserialize, Serialize};

/// Configuration for the record store module (`modules.record_store`).
///
/// Each collection is persisted as its own document; the values are file
/// names relative to the storage data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordStoreConfig {
    pub records_file: String,
    pub tickets_file: String,
    pub logs_file: String,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            records_file: "data.json".to_owned(),
            tickets_file: "tickets.json".to_owned(),
            logs_file: "logs.json".to_owned(),
        }
    }
}
