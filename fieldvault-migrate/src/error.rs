//! Error types for the migration scanner.

use fieldvault_store::StoreError;
use thiserror::Error;

/// Result type for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors that can abort one collection's migration.
///
/// These never abort the whole run: `migrate_all` isolates them per
/// collection and continues with the next mapping.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Reading or updating the datastore failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
