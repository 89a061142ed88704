//! In-memory collection store, used by tests and dry runs.

use crate::collection::{Collection, FieldPath, Record};
use crate::error::{StoreError, StoreResult};
use crate::CollectionStore;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Collection store backed by an in-memory map.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<Collection, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to a collection.
    pub fn insert(&self, collection: Collection, record: Record) {
        self.inner
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(record);
    }

    /// Snapshot of a collection's records, in insertion order.
    pub fn records(&self, collection: Collection) -> Vec<Record> {
        self.inner
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl CollectionStore for MemoryStore {
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
        apply_changes(collection, record, changes)
    }
}

pub(crate) fn apply_changes(
    collection: Collection,
    record: &mut Record,
    changes: &[(FieldPath, String)],
) -> StoreResult<()> {
    for (path, value) in changes {
        if !path.set(&mut record.data, value.clone()) {
            return Err(StoreError::FieldNotFound {
                collection: collection.name().to_string(),
                id: record.id.clone(),
                pointer: path.pointer(),
            });
        }
    }
    Ok(())
}
