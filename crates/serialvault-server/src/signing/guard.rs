//! Replay prevention over the signing log.
//!
//! [`DuplicateGuard::exists`] is only an early exit. The UNIQUE index on
//! `signinglog(serial_number, fingerprint)` decides races, and a losing
//! [`DuplicateGuard::record`] reports [`RecordError::Conflict`].

use super::store::SigningLogStore;
use crate::storage::{DatabaseError, NewSigningLog, SigningLog};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("signing log already holds this serial and fingerprint")]
    Conflict,

    #[error("signing log write failed: {0}")]
    Storage(DatabaseError),
}

pub struct DuplicateGuard<'a, S> {
    log: &'a S,
}

impl<'a, S: SigningLogStore> DuplicateGuard<'a, S> {
    pub const fn new(log: &'a S) -> Self {
        Self { log }
    }

    /// Whether the pair was signed before. Reads only.
    pub async fn exists(&self, serial_number: &str, fingerprint: &str) -> Result<bool, DatabaseError> {
        self.log.signing_log_exists(serial_number, fingerprint).await
    }

    /// Append the entry for a signature that was just produced.
    pub async fn record(&self, entry: &NewSigningLog) -> Result<SigningLog, RecordError> {
        self.log.insert_signing_log(entry).await.map_err(|e| match e {
            e if e.is_duplicate() => RecordError::Conflict,
            other => RecordError::Storage(other),
        })
    }
}
