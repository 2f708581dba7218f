//! Pipeline failures, each tied to the stage that produced it.

use serialvault_core::ErrorKind;
use serialvault_crypto::CryptoError;

use crate::storage::DatabaseError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Authenticated,
    BodyPresent,
    Decoded,
    TypeValid,
    ModelResolved,
    KeyActive,
    KeyDecoded,
    NotDuplicate,
    Signed,
    Logged,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::BodyPresent => "body-present",
            Self::Decoded => "decoded",
            Self::TypeValid => "type-valid",
            Self::ModelResolved => "model-resolved",
            Self::KeyActive => "key-active",
            Self::KeyDecoded => "key-decoded",
            Self::NotDuplicate => "not-duplicate",
            Self::Signed => "signed",
            Self::Logged => "logged",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a signing request was refused.
///
/// Messages of server-side failures stay generic; the underlying error is
/// kept for logs.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("Invalid API key")]
    Auth,

    #[error("Uninitialized POST data")]
    EmptyData,

    #[error("Payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{0}")]
    Decode(CryptoError),

    #[error("The '{0}' header is missing or empty")]
    MissingHeader(&'static str),

    #[error("Invalid assertion type '{actual}', expected '{expected}'")]
    InvalidType { expected: String, actual: String },

    #[error("Cannot find model with the matching brand and model")]
    ModelNotFound,

    #[error("Sub-store mapping {substore_id} references a model that cannot be found")]
    InconsistentSubstore { substore_id: i64, from_model_id: i64 },

    #[error("Several sub-store mappings match the brand, model and serial")]
    AmbiguousSubstore { from_model_ids: Vec<i64> },

    #[error("Error retrieving the model")]
    CatalogUnavailable(DatabaseError),

    #[error("The model is linked with an inactive signing-key")]
    InactiveModel,

    #[error("{0}")]
    InvalidDeviceKey(CryptoError),

    #[error("The serial number and device-key have already been used to sign a device")]
    DuplicateAssertion,

    #[error("Error checking the signing log")]
    DuplicateCheckFailed(DatabaseError),

    #[error("Error signing the assertion")]
    SigningFailed(CryptoError),

    #[error("Error saving the signing log")]
    LoggingFailed(DatabaseError),

    /// Lost a race against an identical request.
    #[error("The serial number and device-key have already been used to sign a device")]
    Conflict,
}

impl SignError {
    /// Stage at which the request stopped.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Auth => Stage::Authenticated,
            Self::EmptyData | Self::PayloadTooLarge { .. } => Stage::BodyPresent,
            Self::Decode(_) => Stage::Decoded,
            Self::InvalidType { .. } | Self::MissingHeader(_) => Stage::TypeValid,
            Self::ModelNotFound
            | Self::InconsistentSubstore { .. }
            | Self::AmbiguousSubstore { .. }
            | Self::CatalogUnavailable(_) => Stage::ModelResolved,
            Self::InactiveModel => Stage::KeyActive,
            Self::InvalidDeviceKey(_) => Stage::KeyDecoded,
            Self::DuplicateAssertion | Self::DuplicateCheckFailed(_) => Stage::NotDuplicate,
            Self::SigningFailed(_) => Stage::Signed,
            Self::LoggingFailed(_) | Self::Conflict => Stage::Logged,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth => ErrorKind::Auth,
            Self::EmptyData | Self::PayloadTooLarge { .. } | Self::Decode(_) | Self::MissingHeader(_) => {
                ErrorKind::MalformedInput
            }
            Self::InvalidType { .. } => ErrorKind::TypeMismatch,
            Self::ModelNotFound | Self::InconsistentSubstore { .. } | Self::AmbiguousSubstore { .. } => {
                ErrorKind::ResolutionFailure
            }
            Self::InactiveModel => ErrorKind::InactiveModel,
            Self::InvalidDeviceKey(_) => ErrorKind::InvalidKeyMaterial,
            Self::DuplicateAssertion | Self::Conflict => ErrorKind::DuplicateAssertion,
            Self::SigningFailed(_) => ErrorKind::SigningFailure,
            Self::CatalogUnavailable(_) | Self::DuplicateCheckFailed(_) | Self::LoggingFailed(_) => {
                ErrorKind::PersistenceFailure
            }
        }
    }

    /// Finer-grained reason within a kind, when one is useful to callers.
    pub const fn subcode(&self) -> Option<&'static str> {
        match self {
            Self::PayloadTooLarge { .. } => Some("payload-too-large"),
            Self::MissingHeader(_) => Some("missing-header"),
            Self::InconsistentSubstore { .. } => Some("inconsistent-substore"),
            Self::AmbiguousSubstore { .. } => Some("ambiguous-substore"),
            Self::Conflict => Some("conflict"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Authenticated < Stage::Decoded);
        assert!(Stage::NotDuplicate < Stage::Signed);
        assert!(Stage::Signed < Stage::Logged);
    }

    #[test]
    fn conflict_reads_as_duplicate() {
        let err = SignError::Conflict;
        assert_eq!(err.kind(), ErrorKind::DuplicateAssertion);
        assert_eq!(err.subcode(), Some("conflict"));
        assert_eq!(err.stage(), Stage::Logged);
        assert_eq!(err.to_string(), SignError::DuplicateAssertion.to_string());
    }

    #[test]
    fn storage_failures_are_server_errors() {
        for err in [
            SignError::CatalogUnavailable(DatabaseError::Connection("down".into())),
            SignError::DuplicateCheckFailed(DatabaseError::Connection("down".into())),
            SignError::LoggingFailed(DatabaseError::Connection("down".into())),
        ] {
            assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
            assert!(!err.kind().is_client_error());
            assert!(!err.to_string().contains("down"));
        }
    }

    #[test]
    fn inconsistent_substore_is_a_resolution_failure() {
        let err = SignError::InconsistentSubstore {
            substore_id: 1,
            from_model_id: 2,
        };
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
        assert_eq!(err.stage(), Stage::ModelResolved);
    }
}
