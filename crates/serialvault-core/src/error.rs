//! Error types for the Serial Vault core library.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure categories reported to callers of the vault.
///
/// Every error that crosses the service boundary is classified as exactly one
/// kind. The kind decides the stable `error_code` and whether the caller or
/// the server is to blame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the required credential or permission.
    Auth,
    /// Missing, empty, oversized or undecodable request body.
    MalformedInput,
    /// Decoded assertion is not of the expected type.
    TypeMismatch,
    /// No model or sub-store matches the supplied identity.
    ResolutionFailure,
    /// The resolved model is bound to an inactive signing key.
    InactiveModel,
    /// The device public key cannot be parsed or fingerprinted.
    InvalidKeyMaterial,
    /// The (serial, fingerprint) pair was signed before.
    DuplicateAssertion,
    /// The signing authority rejected or failed the request.
    SigningFailure,
    /// Storage unavailable or a write failed.
    PersistenceFailure,
    /// A create/update collides with an existing unique record.
    UniquenessViolation,
    /// An administration lookup by id found nothing.
    NotFound,
}

impl ErrorKind {
    /// Stable machine-readable code for the `error_code` response field.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Auth => "error-auth",
            Self::MalformedInput => "invalid-data",
            Self::TypeMismatch => "invalid-type",
            Self::ResolutionFailure => "invalid-model",
            Self::InactiveModel => "inactive-model",
            Self::InvalidKeyMaterial => "invalid-device-key",
            Self::DuplicateAssertion => "duplicate-assertion",
            Self::SigningFailure => "signing-assertion",
            Self::PersistenceFailure => "persistence-failure",
            Self::UniquenessViolation => "duplicate-record",
            Self::NotFound => "not-found",
        }
    }

    /// `true` when the failure was caused by the request rather than the server.
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::SigningFailure | Self::PersistenceFailure)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_side_kinds_are_not_client_errors() {
        assert!(!ErrorKind::SigningFailure.is_client_error());
        assert!(!ErrorKind::PersistenceFailure.is_client_error());
        assert!(ErrorKind::DuplicateAssertion.is_client_error());
        assert!(ErrorKind::Auth.is_client_error());
    }

    #[test]
    fn codes_are_unique() {
        let kinds = [
            ErrorKind::Auth,
            ErrorKind::MalformedInput,
            ErrorKind::TypeMismatch,
            ErrorKind::ResolutionFailure,
            ErrorKind::InactiveModel,
            ErrorKind::InvalidKeyMaterial,
            ErrorKind::DuplicateAssertion,
            ErrorKind::SigningFailure,
            ErrorKind::PersistenceFailure,
            ErrorKind::UniquenessViolation,
            ErrorKind::NotFound,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
