//! File-backed collection store.
//!
//! Holds the whole dataset as one JSON document keyed by collection name,
//! so the migration CLI can operate on an exported dataset in place. Every
//! partial update is flushed to disk immediately, matching the per-record
//! persistence the migration scanner assumes.

use crate::collection::{Collection, FieldPath, Record};
use crate::error::{StoreError, StoreResult};
use crate::memory::apply_changes;
use crate::CollectionStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Collection store persisted as a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<BTreeMap<Collection, Vec<Record>>>,
}

impl JsonFileStore {
    /// Loads the dataset at `path`. Unknown collection keys are skipped
    /// with a warning; a missing file yields an empty store.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let mut inner = BTreeMap::new();
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let document: BTreeMap<String, Vec<Record>> = serde_json::from_str(&raw)?;
            for (name, records) in document {
                match Collection::from_name(&name) {
                    Some(collection) => {
                        inner.insert(collection, records);
                    }
                    None => {
                        tracing::warn!(collection = %name, "skipping unknown collection in dataset");
                    }
                }
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(inner),
        })
    }

    fn flush(&self, inner: &BTreeMap<Collection, Vec<Record>>) -> StoreResult<()> {
        let document: BTreeMap<&str, &Vec<Record>> = inner
            .iter()
            .map(|(collection, records)| (collection.name(), records))
            .collect();
        let raw = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl CollectionStore for JsonFileStore {
    fn count(&self, collection: Collection) -> StoreResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.get(&collection).map_or(0, |records| records.len()) as u64)
    }

    fn fetch_page(
        &self,
        collection: Collection,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        let inner = self.inner.lock().unwrap();
        let records = match inner.get(&collection) {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };
        Ok(records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: &[(FieldPath, String)],
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::RecordNotFound {
                collection: collection.name().to_string(),
                id: id.to_string(),
            })?;
        apply_changes(collection, record, changes)?;
        self.flush(&inner)
    }
}
