//! Signing authority.
//!
//! The vault never touches key material directly: it hands validated
//! headers, the body and the model's sealed key to a [`SigningAuthority`]
//! and returns whatever bytes come back.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::assertion::Assertion;
use crate::error::CryptoError;

/// Everything the authority needs to produce one signed assertion.
#[derive(Clone, Copy)]
pub struct SignRequest<'a> {
    pub assertion_type: &'a str,
    pub headers: &'a [(String, String)],
    pub body: &'a [u8],
    pub authority_id: &'a str,
    pub key_id: &'a str,
    pub sealed_key: &'a [u8],
}

impl std::fmt::Debug for SignRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignRequest")
            .field("assertion_type", &self.assertion_type)
            .field("authority_id", &self.authority_id)
            .field("key_id", &self.key_id)
            .field("sealed_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Capability that turns a validated request into signed assertion bytes.
pub trait SigningAuthority: Send + Sync {
    fn sign(&self, request: &SignRequest<'_>) -> Result<Vec<u8>, CryptoError>;
}

/// Ed25519 authority whose sealed keys are base64-encoded 32-byte seeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Authority;

impl Ed25519Authority {
    fn unseal(sealed_key: &[u8]) -> Result<SigningKey, CryptoError> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(sealed_key)
                .map_err(|e| CryptoError::SigningFailed(format!("sealed key is not base64: {e}")))?,
        );
        let mut seed: [u8; 32] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: 32,
                    actual: decoded.len(),
                })?;
        let key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Ok(key)
    }
}

impl SigningAuthority for Ed25519Authority {
    fn sign(&self, request: &SignRequest<'_>) -> Result<Vec<u8>, CryptoError> {
        let key = Self::unseal(request.sealed_key)?;
        if key_id_of(&key.verifying_key()) != request.key_id {
            return Err(CryptoError::KeyIdMismatch {
                expected: request.key_id.to_string(),
            });
        }

        let mut assertion = Assertion::new(request.assertion_type).with_body(request.body);
        for (name, value) in request.headers {
            if name != "type" && name != "body-length" {
                assertion.set_header(name, value.clone());
            }
        }
        assertion.set_header("authority-id", request.authority_id);
        assertion.set_header("sign-key-id", request.key_id);

        let signature = key.sign(&assertion.content());
        assertion.set_signature(STANDARD.encode(signature.to_bytes()));
        Ok(assertion.encode())
    }
}

/// Key id of a signing key: lowercase hex SHA-256 of the public key.
pub fn key_id_of(key: &VerifyingKey) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Seal a signing key in the form [`Ed25519Authority`] expects.
pub fn seal_key(key: &SigningKey) -> Vec<u8> {
    let seed = Zeroizing::new(key.to_bytes());
    STANDARD.encode(seed.as_slice()).into_bytes()
}
