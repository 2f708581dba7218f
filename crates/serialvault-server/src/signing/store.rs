//! Storage capabilities the signing path depends on.
//!
//! The pipeline is generic over these traits so tests can swap in fakes;
//! [`VaultDatabase`] implements both by delegating to its queries.

use std::future::Future;

use crate::storage::{DatabaseError, Model, NewSigningLog, Scope, SigningLog, Substore, VaultDatabase};

/// Read access to models and sub-store mappings.
pub trait ModelCatalog: Send + Sync {
    /// All mappings for the pivot, ordered by id.
    fn find_substores_by_pivot(
        &self,
        brand_id: &str,
        model_name: &str,
        serial_number: &str,
        scope: &Scope,
    ) -> impl Future<Output = Result<Vec<Substore>, DatabaseError>> + Send;

    fn find_model_by_id(
        &self,
        id: i64,
        scope: &Scope,
    ) -> impl Future<Output = Result<Option<Model>, DatabaseError>> + Send;

    fn find_model(
        &self,
        brand_id: &str,
        name: &str,
        revision: i64,
        scope: &Scope,
    ) -> impl Future<Output = Result<Option<Model>, DatabaseError>> + Send;
}

/// The append-only signing log.
pub trait SigningLogStore: Send + Sync {
    fn signing_log_exists(
        &self,
        serial_number: &str,
        fingerprint: &str,
    ) -> impl Future<Output = Result<bool, DatabaseError>> + Send;

    /// Must fail with [`DatabaseError::UniqueViolation`] when the
    /// (serial, fingerprint) pair already exists.
    fn insert_signing_log(
        &self,
        entry: &NewSigningLog,
    ) -> impl Future<Output = Result<SigningLog, DatabaseError>> + Send;
}

impl ModelCatalog for VaultDatabase {
    async fn find_substores_by_pivot(
        &self,
        brand_id: &str,
        model_name: &str,
        serial_number: &str,
        scope: &Scope,
    ) -> Result<Vec<Substore>, DatabaseError> {
        Self::find_substores_by_pivot(self, brand_id, model_name, serial_number, scope).await
    }

    async fn find_model_by_id(&self, id: i64, scope: &Scope) -> Result<Option<Model>, DatabaseError> {
        Self::find_model_by_id(self, id, scope).await
    }

    async fn find_model(
        &self,
        brand_id: &str,
        name: &str,
        revision: i64,
        scope: &Scope,
    ) -> Result<Option<Model>, DatabaseError> {
        Self::find_model(self, brand_id, name, revision, scope).await
    }
}

impl SigningLogStore for VaultDatabase {
    async fn signing_log_exists(
        &self,
        serial_number: &str,
        fingerprint: &str,
    ) -> Result<bool, DatabaseError> {
        Self::signing_log_exists(self, serial_number, fingerprint).await
    }

    async fn insert_signing_log(&self, entry: &NewSigningLog) -> Result<SigningLog, DatabaseError> {
        Self::insert_signing_log(self, entry).await
    }
}
