//! Error types for the encryption layer.
//!
//! These never cross the public `encrypt`/`decrypt`/`is_encrypted` surface —
//! that surface is fail-open and resolves every failure to a sentinel or to
//! the input unchanged. They exist for the internal parse/decrypt plumbing.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Text is not a structurally valid payload.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// GCM tag verification failed (wrong key or tampered data).
    #[error("authentication failed")]
    Authentication,

    /// Decrypted bytes were not valid UTF-8.
    #[error("decrypted data is not valid UTF-8")]
    Utf8,
}
