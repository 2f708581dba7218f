//! Deterministic keys for tests of crates built on this one.

use ed25519_dalek::SigningKey;

use crate::authority::{key_id_of, seal_key};
use crate::device_key::DeviceKey;

/// A signing key in the shape the model catalog stores it.
#[derive(Debug, Clone)]
pub struct TestSigningKey {
    pub key_id: String,
    pub sealed_key: Vec<u8>,
}

/// Signing key derived from a one-byte seed.
pub fn signing_key(seed: u8) -> TestSigningKey {
    let key = SigningKey::from_bytes(&[seed; 32]);
    TestSigningKey {
        key_id: key_id_of(&key.verifying_key()),
        sealed_key: seal_key(&key),
    }
}

/// Device key derived from a one-byte seed.
pub fn device_key(seed: u8) -> DeviceKey {
    DeviceKey::from_verifying_key(SigningKey::from_bytes(&[seed; 32]).verifying_key())
}
