//! Migration tooling for FieldVault.
//!
//! Upgrades previously-unencrypted records in place: every collection with
//! sensitive text fields is scanned in batches and plaintext values are
//! replaced with their encrypted payloads. Running against already-migrated
//! data is a no-op.

mod error;
mod scanner;

pub use error::{MigrateError, MigrateResult};
pub use scanner::{
    migrate_all, migrate_collection, CollectionReport, MigrationOptions, MigrationStats,
};
