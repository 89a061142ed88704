//! Key derivation and the salt-ordered key ring.
//!
//! Keys are derived from one master secret with PBKDF2-HMAC-SHA512.
//! Derivation is deterministic so the same secret across restarts
//! reproduces the same ring and can decrypt old data.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for AES-256-GCM).
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count. Paid once per salt at startup.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// A derived encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Creates a derived key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derives a 32-byte AES key from the master secret and one salt.
pub fn derive_key(master_secret: &str, salt: &str) -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha512>(
        master_secret.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut bytes,
    );
    DerivedKey::from_bytes(bytes)
}

/// One derived key together with the salt that produced it.
#[derive(Clone, Debug)]
pub struct KeyEntry {
    pub salt: String,
    pub key: DerivedKey,
}

/// Ordered set of derived keys, one per configured salt.
///
/// Order mirrors the salt list: index 0 is the current key and is used for
/// all new encryption; later entries exist only so payloads written under
/// rotated-out salts still decrypt. The ring is immutable after
/// construction — rotating keys means restarting with an updated salt list.
#[derive(Clone, Debug)]
pub struct KeyRing {
    entries: Vec<KeyEntry>,
}

impl KeyRing {
    /// Derives one key per salt, preserving salt order.
    pub fn derive(master_secret: &str, salts: &[String]) -> Self {
        let entries = salts
            .iter()
            .map(|salt| KeyEntry {
                salt: salt.clone(),
                key: derive_key(master_secret, salt),
            })
            .collect();
        Self { entries }
    }

    /// The current key — used for every new `encrypt`.
    pub fn current(&self) -> &KeyEntry {
        &self.entries[0]
    }

    /// Iterates entries in salt order (current first).
    pub fn iter(&self) -> impl Iterator<Item = &KeyEntry> {
        self.entries.iter()
    }

    /// Number of keys in the ring.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the ring holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
