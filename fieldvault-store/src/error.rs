//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur reading or updating a collection store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file IO failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// No record with the given id exists in the collection.
    #[error("record '{id}' not found in collection '{collection}'")]
    RecordNotFound { collection: String, id: String },

    /// A field path named in a partial update is absent from the record.
    #[error("field '{pointer}' not found on record '{id}' in collection '{collection}'")]
    FieldNotFound {
        collection: String,
        id: String,
        pointer: &'static str,
    },
}
