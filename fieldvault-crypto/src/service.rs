//! The field encryption service.
//!
//! `FieldCipher` is an explicit object holding the derived `KeyRing` (or
//! pass-through mode when no key material is configured). It is built once
//! at process start and shared by reference; `encrypt`, `decrypt` and
//! `is_encrypted` take `&self`, touch only the immutable ring, and are safe
//! to call concurrently.
//!
//! The public surface is fail-open by design: no operation ever returns an
//! error or panics. Failures resolve to a sentinel string or to the input
//! unchanged. Whether production should instead fail closed (refuse to
//! persist plaintext when keys are missing) is an open question inherited
//! from the original deployment; see DESIGN.md before changing it.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DerivedKey, KeyRing};
use crate::payload::{self, Payload, IV_SIZE, TAG_SIZE};
use aes_gcm::{
    aead::{
        consts::{U12, U16},
        Aead, KeyInit,
    },
    aes::Aes256,
    AesGcm, Nonce,
};
use rand::RngCore;

/// AES-256-GCM with the 16-byte IV this wire format mandates.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Same cipher with a truncated 12-byte tag, for legacy payloads.
type Aes256Gcm16Tag12 = AesGcm<Aes256, U16, U12>;

/// Maximum nested encryption layers `decrypt` will unwrap. Normal data
/// nests at most once or twice across salt rotations.
pub const MAX_DEPTH: u32 = 5;

/// Stored in place of a null field. Literal text, never encrypted.
pub const NO_CONTENT: &str = "[No content]";

/// Stored in place of empty or whitespace-only input. Literal text.
pub const EMPTY_CONTENT: &str = "[Empty content]";

/// Returned when no configured key decrypts a payload.
pub const UNDECRYPTABLE: &str =
    "[This content could not be decrypted. Please contact support.]";

/// Returned when a payload nests deeper than `MAX_DEPTH`.
pub const DEPTH_LIMIT: &str = "[Decryption depth limit reached]";

enum Mode {
    Active(KeyRing),
    PassThrough,
}

/// Field-level encryption service.
pub struct FieldCipher {
    mode: Mode,
}

impl FieldCipher {
    /// Builds the service from process configuration: an optional master
    /// secret and a comma-separated, ordered salt list (index 0 current).
    ///
    /// A missing or empty secret, or an empty salt list, is not fatal: the
    /// service enters pass-through mode and `encrypt`/`decrypt` become
    /// identity functions. This keeps the host application available at the
    /// cost of storing plaintext, and is logged as a warning.
    pub fn initialize(master_secret: Option<&str>, salt_csv: &str) -> Self {
        let secret = master_secret.map(str::trim).filter(|s| !s.is_empty());
        let salts: Vec<String> = salt_csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        match secret {
            Some(secret) if !salts.is_empty() => {
                let ring = KeyRing::derive(secret, &salts);
                tracing::info!(keys = ring.len(), "field encryption active");
                Self {
                    mode: Mode::Active(ring),
                }
            }
            Some(_) => {
                tracing::warn!(
                    "salt list is empty; field encryption disabled (pass-through mode)"
                );
                Self {
                    mode: Mode::PassThrough,
                }
            }
            None => {
                tracing::warn!(
                    "no master secret configured; field encryption disabled (pass-through mode)"
                );
                Self {
                    mode: Mode::PassThrough,
                }
            }
        }
    }

    /// An uninitialized service: `encrypt`/`decrypt` are identity functions.
    pub fn pass_through() -> Self {
        Self {
            mode: Mode::PassThrough,
        }
    }

    /// Whether key material is loaded.
    pub fn is_active(&self) -> bool {
        matches!(self.mode, Mode::Active(_))
    }

    /// Encrypts `text` under the current key. The happy path returns the
    /// canonical 4-part payload, but the operation never fails: in
    /// pass-through mode or on a cryptographic error the input comes back
    /// unchanged, and whitespace-only input becomes the `EMPTY_CONTENT`
    /// sentinel stored as literal text.
    pub fn encrypt(&self, text: &str) -> String {
        let ring = match &self.mode {
            Mode::Active(ring) => ring,
            Mode::PassThrough => return text.to_string(),
        };
        if text.trim().is_empty() {
            return EMPTY_CONTENT.to_string();
        }
        match encrypt_once(&ring.current().key, text) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "encryption failed; keeping plaintext");
                text.to_string()
            }
        }
    }

    /// JSON-value front end used by the migration scanner: nulls become the
    /// `NO_CONTENT` sentinel, strings are encrypted directly, anything else
    /// is stringified first so the stored type stays uniform.
    pub fn encrypt_field(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::Null => NO_CONTENT.to_string(),
            serde_json::Value::String(s) => self.encrypt(s),
            other => self.encrypt(&other.to_string()),
        }
    }

    /// Decrypts a payload, recursively unwrapping nested encryption
    /// accumulated across historical salt rotations (bounded by
    /// `MAX_DEPTH`). Plain text that does not match the payload shape is
    /// returned as-is. Never fails: exhausted keys and excessive nesting
    /// resolve to sentinels, and pass-through mode returns the input.
    pub fn decrypt(&self, text: &str) -> String {
        let ring = match &self.mode {
            Mode::Active(ring) => ring,
            Mode::PassThrough => return text.to_string(),
        };
        unwrap_layers(ring, text, 0)
    }

    /// Structural check of whether `text` matches the payload shape.
    /// Mode-independent and non-cryptographic.
    pub fn is_encrypted(&self, text: &str) -> bool {
        payload::looks_encrypted(text)
    }
}

fn encrypt_once(key: &DerivedKey, plaintext: &str) -> CryptoResult<String> {
    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm16::new(key.as_bytes().into());
    let sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    // aes-gcm appends the tag to the ciphertext
    let split = sealed.len() - TAG_SIZE;
    let payload = Payload {
        iv,
        tag: sealed[split..].to_vec(),
        ciphertext: sealed[..split].to_vec(),
    };
    Ok(payload.encode())
}

fn unwrap_layers(ring: &KeyRing, text: &str, depth: u32) -> String {
    if !payload::looks_encrypted(text) {
        // Base case: real plaintext, or a fully unwrapped result.
        return text.to_string();
    }
    if depth >= MAX_DEPTH {
        tracing::error!(
            max_depth = MAX_DEPTH,
            "decryption depth limit reached; payload is corrupt or over-layered"
        );
        return DEPTH_LIMIT.to_string();
    }

    // Parsing is key-independent, so a malformed payload fails once here
    // rather than once per key.
    if let Ok(parsed) = Payload::parse(text) {
        for entry in ring.iter() {
            match decrypt_once(&entry.key, &parsed) {
                Ok(plain) => return unwrap_layers(ring, &plain, depth + 1),
                // Wrong key or tampered data: try the next key.
                Err(_) => continue,
            }
        }
    }

    tracing::warn!("no configured key decrypts payload");
    UNDECRYPTABLE.to_string()
}

fn decrypt_once(key: &DerivedKey, payload: &Payload) -> CryptoResult<String> {
    let mut sealed = payload.ciphertext.clone();
    sealed.extend_from_slice(&payload.tag);
    let nonce = Nonce::from_slice(&payload.iv);

    let plain = match payload.tag.len() {
        12 => Aes256Gcm16Tag12::new(key.as_bytes().into()).decrypt(nonce, sealed.as_ref()),
        16 => Aes256Gcm16::new(key.as_bytes().into()).decrypt(nonce, sealed.as_ref()),
        other => {
            return Err(CryptoError::Malformed(format!(
                "unsupported tag length {other}"
            )))
        }
    }
    .map_err(|_| CryptoError::Authentication)?;

    String::from_utf8(plain).map_err(|_| CryptoError::Utf8)
}
