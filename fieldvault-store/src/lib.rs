//! Collection store surface for FieldVault.
//!
//! The migration tool never talks to the real ORM: it sees the datastore as
//! an enumerable, paginated collection store it can read and partially
//! update, expressed here as the [`CollectionStore`] trait. Two
//! implementations are provided — an in-memory store for tests and a
//! JSON-file-backed store for the CLI.
//!
//! Pagination is by stable offset and assumes no concurrent mutation of the
//! collection during a scan. That is a documented precondition of the
//! migration run, not something this layer enforces with locking.

mod collection;
mod error;
mod json_file;
mod memory;

pub use collection::{fields, Collection, FieldPath, Record};
pub use error::{StoreError, StoreResult};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Read and partially update paginated collections of records.
pub trait CollectionStore: Send + Sync {
    /// Number of records in the collection.
    fn count(&self, collection: Collection) -> StoreResult<u64>;

    /// Fetches `limit` records starting at `offset`, in stable order.
    fn fetch_page(
        &self,
        collection: Collection,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Record>>;

    /// Persists a partial update of just the named fields on one record.
    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        changes: &[(FieldPath, String)],
    ) -> StoreResult<()>;
}
