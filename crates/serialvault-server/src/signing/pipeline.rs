//! The serial-assertion signing pipeline.
//!
//! A request moves through the stages of [`Stage`](super::error::Stage) in order and stops at
//! the first failure. Signed bytes are only handed back once the signing
//! log entry is committed, so a request dropped midway never leaks an
//! unrecorded signature.

use std::sync::Arc;

use serialvault_core::config::SigningConfig;
use serialvault_crypto::{Assertion, CryptoError, DeviceKey, SignRequest, SigningAuthority, decode};
use tracing::{Span, debug, field, info, instrument, warn};

use super::error::SignError;
use super::guard::{DuplicateGuard, RecordError};
use super::resolver::{ModelIdentity, ModelResolver, ResolveError};
use super::store::{ModelCatalog, SigningLogStore};
use crate::auth::check_api_key;
use crate::storage::{NewSigningLog, Scope, SigningLog};

/// Everything a signing request needs, built once at startup.
pub struct VaultContext<S> {
    store: S,
    signer: Arc<dyn SigningAuthority>,
    config: SigningConfig,
}

/// An inbound signing request.
#[derive(Debug, Clone, Copy)]
pub struct SerialRequest<'a> {
    pub api_key: Option<&'a str>,
    pub payload: &'a [u8],
}

/// A successful signing: the authority's output and its log entry.
#[derive(Debug, Clone)]
pub struct Signed {
    pub assertion: Vec<u8>,
    pub log: SigningLog,
}

impl<S> VaultContext<S> {
    pub fn new(store: S, signer: Arc<dyn SigningAuthority>, config: SigningConfig) -> Self {
        Self {
            store,
            signer,
            config,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn config(&self) -> &SigningConfig {
        &self.config
    }
}

impl<S: ModelCatalog + SigningLogStore> VaultContext<S> {
    /// Run a request through every stage.
    #[instrument(
        skip_all,
        fields(
            request_id = %uuid::Uuid::new_v4(),
            brand = field::Empty,
            model = field::Empty,
            serial = field::Empty,
        )
    )]
    pub async fn sign_serial(&self, request: SerialRequest<'_>) -> Result<Signed, SignError> {
        let result = self.run(request).await;
        match &result {
            Ok(signed) => info!(log_id = signed.log.id, "assertion signed"),
            Err(e) => warn!(
                stage = %e.stage(),
                code = e.kind().code(),
                error = ?e,
                "signing request rejected"
            ),
        }
        result
    }

    async fn run(&self, request: SerialRequest<'_>) -> Result<Signed, SignError> {
        if !check_api_key(&self.config.api_keys, request.api_key) {
            return Err(SignError::Auth);
        }

        if request.payload.is_empty() {
            return Err(SignError::EmptyData);
        }
        if request.payload.len() > self.config.max_payload_bytes {
            return Err(SignError::PayloadTooLarge {
                limit: self.config.max_payload_bytes,
            });
        }

        let assertion = decode(request.payload).map_err(SignError::Decode)?;

        if assertion.assertion_type() != self.config.assertion_type {
            return Err(SignError::InvalidType {
                expected: self.config.assertion_type.clone(),
                actual: assertion.assertion_type().to_string(),
            });
        }
        let brand_id = required_header(&assertion, "brand-id")?;
        let model_name = required_header(&assertion, "model")?;
        let serial_number = required_header(&assertion, "serial")?;

        let span = Span::current();
        span.record("brand", brand_id);
        span.record("model", model_name);
        span.record("serial", serial_number);

        let identity = ModelIdentity {
            brand_id,
            model_name,
            serial_number,
            revision: assertion.revision(),
        };
        // Signing requests carry an API key, not a user.
        let model = ModelResolver::new(&self.store)
            .resolve(&identity, &Scope::Unscoped)
            .await
            .map_err(|e| match e {
                ResolveError::NotFound => SignError::ModelNotFound,
                ResolveError::Inconsistent {
                    substore_id,
                    from_model_id,
                } => SignError::InconsistentSubstore {
                    substore_id,
                    from_model_id,
                },
                ResolveError::Ambiguous { from_model_ids } => {
                    SignError::AmbiguousSubstore { from_model_ids }
                }
                ResolveError::Storage(e) => SignError::CatalogUnavailable(e),
            })?;
        debug!(model_id = model.id, key_id = %model.key_id, "model resolved");

        if !model.key_active {
            return Err(SignError::InactiveModel);
        }

        let device_key = assertion
            .header("device-key")
            .ok_or(CryptoError::MissingHeader("device-key"))
            .and_then(DeviceKey::from_header)
            .map_err(SignError::InvalidDeviceKey)?;
        let fingerprint = device_key.fingerprint();

        let guard = DuplicateGuard::new(&self.store);
        if guard
            .exists(serial_number, &fingerprint)
            .await
            .map_err(SignError::DuplicateCheckFailed)?
        {
            return Err(SignError::DuplicateAssertion);
        }

        let signed = self
            .signer
            .sign(&SignRequest {
                assertion_type: assertion.assertion_type(),
                headers: assertion.headers(),
                body: assertion.body(),
                authority_id: &model.authority_id,
                key_id: &model.key_id,
                sealed_key: &model.sealed_key,
            })
            .map_err(SignError::SigningFailed)?;

        let log = guard
            .record(&NewSigningLog {
                make: brand_id.to_string(),
                model: model_name.to_string(),
                serial_number: serial_number.to_string(),
                fingerprint,
            })
            .await
            .map_err(|e| match e {
                RecordError::Conflict => SignError::Conflict,
                RecordError::Storage(e) => SignError::LoggingFailed(e),
            })?;

        Ok(Signed {
            assertion: signed,
            log,
        })
    }
}

fn required_header<'a>(assertion: &'a Assertion, name: &'static str) -> Result<&'a str, SignError> {
    assertion
        .header(name)
        .filter(|v| !v.is_empty())
        .ok_or(SignError::MissingHeader(name))
}
