//! Crypto error types.

/// Errors from decoding assertions, parsing keys and signing.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Malformed assertion: {0}")]
    Malformed(String),

    #[error("Assertion is missing the '{0}' header")]
    MissingHeader(&'static str),

    #[error("Invalid device-key: {0}")]
    InvalidDeviceKey(String),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Sealed key does not match key id {expected}")]
    KeyIdMismatch { expected: String },

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
