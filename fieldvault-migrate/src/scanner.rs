//! Batch migration of plaintext sensitive fields to encrypted form.
//!
//! Walks every collection in fixed-size batches by stable offset and
//! re-writes only fields that are not yet encrypted, as a partial update of
//! just the changed fields. Already-encrypted values are never touched, so
//! the scan is idempotent and safe to re-run.
//!
//! Batches within one collection run strictly sequentially; the offset
//! cursor assumes no concurrent mutation of that collection during the run.

use crate::error::{MigrateError, MigrateResult};
use fieldvault_crypto::FieldCipher;
use fieldvault_store::{Collection, CollectionStore, FieldPath};

/// Options controlling a migration run.
#[derive(Clone, Debug)]
pub struct MigrationOptions {
    /// Records fetched and processed per batch.
    pub batch_size: u64,
    /// Compute and report every change without persisting any of them.
    pub dry_run: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            dry_run: false,
        }
    }
}

/// Counters tracked per collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationStats {
    /// Records in the collection when the scan started.
    pub total_records: u64,
    /// Records examined.
    pub processed_records: u64,
    /// Records that had at least one field encrypted (or would have, in a
    /// dry run).
    pub encrypted_records: u64,
}

/// Outcome of migrating one collection.
#[derive(Debug)]
pub struct CollectionReport {
    pub collection: Collection,
    pub outcome: MigrateResult<MigrationStats>,
}

/// Migrates a single collection.
///
/// For each record and each of the collection's sensitive fields: skip
/// absent, null, empty, or already-encrypted values; otherwise compute the
/// encrypted form (non-string values are stringified first). Records with
/// any changed field are persisted as a partial update unless `dry_run`
/// is set.
pub fn migrate_collection(
    store: &dyn CollectionStore,
    cipher: &FieldCipher,
    collection: Collection,
    options: &MigrationOptions,
) -> MigrateResult<MigrationStats> {
    let mut stats = MigrationStats {
        total_records: store.count(collection)?,
        ..MigrationStats::default()
    };
    tracing::info!(
        collection = %collection,
        total = stats.total_records,
        dry_run = options.dry_run,
        "migrating collection"
    );

    let mut offset = 0u64;
    loop {
        let batch = store.fetch_page(collection, offset, options.batch_size)?;
        if batch.is_empty() {
            break;
        }
        let fetched = batch.len() as u64;

        for record in batch {
            stats.processed_records += 1;

            let mut changes: Vec<(FieldPath, String)> = Vec::new();
            for path in collection.sensitive_fields() {
                let Some(value) = path.get(&record.data) else {
                    continue;
                };
                if value.is_null() {
                    continue;
                }
                // Non-string values are stringified by encrypt_field, so
                // compare against the same textual form it will see.
                let current = match value.as_str() {
                    Some(text) => text.to_string(),
                    None => value.to_string(),
                };
                if current.trim().is_empty() || cipher.is_encrypted(&current) {
                    continue;
                }
                let encrypted = cipher.encrypt_field(value);
                // Pass-through mode and fail-open encryption both hand the
                // value back unchanged; writing it would inflate the
                // counters without encrypting anything.
                if encrypted == current {
                    continue;
                }
                changes.push((*path, encrypted));
            }

            if changes.is_empty() {
                continue;
            }
            stats.encrypted_records += 1;
            tracing::debug!(
                collection = %collection,
                record = %record.id,
                user = collection
                    .user_id_field()
                    .get_str(&record.data)
                    .unwrap_or("unknown"),
                fields = changes.len(),
                dry_run = options.dry_run,
                "encrypting record fields"
            );
            if !options.dry_run {
                store.update_fields(collection, &record.id, &changes)?;
            }
        }

        offset += fetched;
        if fetched < options.batch_size {
            break;
        }
    }

    Ok(stats)
}

/// Runs [`migrate_collection`] sequentially over every collection mapping.
///
/// A failure in one collection aborts only that collection: it is logged
/// with the collection name and the remaining mappings still run. One
/// report is returned per collection.
pub fn migrate_all(
    store: &dyn CollectionStore,
    cipher: &FieldCipher,
    options: &MigrationOptions,
) -> Vec<CollectionReport> {
    Collection::ALL
        .iter()
        .map(|&collection| {
            let outcome = migrate_collection(store, cipher, collection, options);
            if let Err(e) = &outcome {
                tracing::error!(
                    collection = %collection,
                    error = %e,
                    "collection migration failed; continuing with the next one"
                );
            }
            CollectionReport {
                collection,
                outcome,
            }
        })
        .collect()
}

impl CollectionReport {
    /// Stats for a successful collection, if any.
    pub fn stats(&self) -> Option<&MigrationStats> {
        self.outcome.as_ref().ok()
    }

    /// Error message for a failed collection, if any.
    pub fn error(&self) -> Option<&MigrateError> {
        self.outcome.as_ref().err()
    }
}
