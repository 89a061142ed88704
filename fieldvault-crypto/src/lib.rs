//! At-rest field-level encryption for FieldVault.
//!
//! Transparently encrypts and decrypts short text fields stored by the
//! backing datastore. The service is self-describing on the wire (a
//! colon-delimited payload that replaces plaintext in the same column),
//! supports multiple key-derivation salts so keys can rotate without data
//! loss, and recursively unwraps historically double-encrypted values.
//!
//! The whole public surface is three operations on [`FieldCipher`] —
//! `encrypt`, `decrypt`, `is_encrypted` — and none of them ever fails:
//! missing key material degrades to pass-through mode and every runtime
//! failure resolves to a sentinel string.

mod error;
mod key;
mod payload;
mod service;

pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KeyEntry, KeyRing, KEY_SIZE, PBKDF2_ITERATIONS};
pub use payload::{looks_encrypted, Payload, ACCEPTED_TAG_SIZES, IV_SIZE, TAG_SIZE};
pub use service::{
    FieldCipher, DEPTH_LIMIT, EMPTY_CONTENT, MAX_DEPTH, NO_CONTENT, UNDECRYPTABLE,
};
