//! Device public keys and their fingerprints.
//!
//! The `device-key` header carries a base64-encoded 32-byte Ed25519 public
//! key. Its fingerprint is the duplicate-detection key stored in the
//! signing log together with the serial number.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::VerifyingKey;

use crate::error::CryptoError;

/// A parsed device public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceKey {
    key: VerifyingKey,
}

impl DeviceKey {
    /// Parse the base64 `device-key` header value.
    pub fn from_header(value: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(value.trim())
            .map_err(|e| CryptoError::InvalidDeviceKey(format!("not base64: {e}")))?;
        let raw: [u8; 32] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: 32,
                    actual: bytes.len(),
                })?;
        let key = VerifyingKey::from_bytes(&raw)
            .map_err(|e| CryptoError::InvalidDeviceKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn from_verifying_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Base64 form, as carried in the `device-key` header.
    pub fn to_header(&self) -> String {
        STANDARD.encode(self.key.as_bytes())
    }

    /// Stable fingerprint of this key.
    pub fn fingerprint(&self) -> String {
        fingerprint_of(self.key.as_bytes())
    }
}

/// Compute a colon-separated hex SHA-256 fingerprint of raw key bytes.
pub fn fingerprint_of(pubkey_bytes: &[u8; 32]) -> String {
    use sha2::{Digest, Sha256};
    Sha256::digest(pubkey_bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
