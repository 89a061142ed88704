//! The self-describing ciphertext wire format.
//!
//! A payload is the only persisted artifact: a colon-delimited text string
//! that replaces plaintext in the same column, so no schema change is ever
//! needed. Two shapes are accepted:
//!
//! - canonical 4-part: `iv_b64:tagLen:tag_b64:ct_b64` (all new writes)
//! - legacy 3-part: `iv_b64:tag_b64:ct_b64` (tag length inferred)

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};

/// IV length in bytes. Always 16, freshly random per encryption.
pub const IV_SIZE: usize = 16;

/// Auth tag lengths a payload may carry. Anything else is not a valid
/// payload for any key.
pub const ACCEPTED_TAG_SIZES: [usize; 2] = [12, 16];

/// Tag length produced by new encryptions.
pub const TAG_SIZE: usize = 16;

/// A parsed ciphertext payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub iv: [u8; IV_SIZE],
    pub tag: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Payload {
    /// Serializes to the canonical 4-part form.
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            STANDARD.encode(self.iv),
            self.tag.len(),
            STANDARD.encode(&self.tag),
            STANDARD.encode(&self.ciphertext),
        )
    }

    /// Parses either accepted shape, validating IV and tag lengths.
    pub fn parse(text: &str) -> CryptoResult<Self> {
        let parts: Vec<&str> = text.split(':').collect();
        let (iv_b64, declared_len, tag_b64, ct_b64) = match parts.as_slice() {
            [iv, tag, ct] => (*iv, None, *tag, *ct),
            [iv, len, tag, ct] => {
                let len: usize = len
                    .parse()
                    .map_err(|_| CryptoError::Malformed("tag length is not an integer".into()))?;
                (*iv, Some(len), *tag, *ct)
            }
            _ => {
                return Err(CryptoError::Malformed(format!(
                    "expected 3 or 4 segments, got {}",
                    parts.len()
                )))
            }
        };

        let iv_bytes = decode_segment(iv_b64, "iv")?;
        let iv: [u8; IV_SIZE] = iv_bytes
            .try_into()
            .map_err(|_| CryptoError::Malformed("iv is not 16 bytes".into()))?;

        let tag = decode_segment(tag_b64, "tag")?;
        if !ACCEPTED_TAG_SIZES.contains(&tag.len()) {
            return Err(CryptoError::Malformed(format!(
                "unsupported tag length {}",
                tag.len()
            )));
        }
        if let Some(declared) = declared_len {
            if declared != tag.len() {
                return Err(CryptoError::Malformed(
                    "declared tag length does not match tag".into(),
                ));
            }
        }

        let ciphertext = decode_segment(ct_b64, "ciphertext")?;
        if ciphertext.is_empty() {
            return Err(CryptoError::Malformed("empty ciphertext".into()));
        }

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }
}

fn decode_segment(segment: &str, name: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(segment)
        .map_err(|e| CryptoError::Malformed(format!("{name} is not valid base64: {e}")))
}

/// Structural check of whether `text` matches the payload shape.
///
/// No cryptography is performed; a plaintext string coincidentally matching
/// the shape is a false positive. Both `decrypt` (plaintext short-circuit)
/// and the migration scanner (never re-encrypt) rely on this.
pub fn looks_encrypted(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    let data_segments: [&str; 3] = match parts.as_slice() {
        [iv, tag, ct] => [*iv, *tag, *ct],
        [iv, len, tag, ct] => {
            if len.parse::<usize>().is_err() {
                return false;
            }
            [*iv, *tag, *ct]
        }
        _ => return false,
    };
    data_segments
        .iter()
        .all(|seg| !seg.is_empty() && STANDARD.decode(seg).is_ok())
}
