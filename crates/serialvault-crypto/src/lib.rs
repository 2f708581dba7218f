//! Serial Vault crypto library
//!
//! Capabilities the signing pipeline is built on:
//!
//! - **Assertion codec**: text headers + optional body + optional signature
//! - **Device keys**: Ed25519 public keys from the `device-key` header and
//!   their SHA-256 fingerprints
//! - **Signing authority**: the [`SigningAuthority`] trait and an Ed25519
//!   implementation operating on sealed keys

pub mod assertion;
pub mod authority;
pub mod device_key;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_keys;

pub use assertion::{Assertion, decode};
pub use authority::{Ed25519Authority, SignRequest, SigningAuthority, key_id_of, seal_key};
pub use device_key::{DeviceKey, fingerprint_of};
pub use error::CryptoError;
