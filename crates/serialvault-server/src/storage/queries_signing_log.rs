//! Signing-log queries. The signing path only ever inserts and reads.

use serialvault_core::db::{DatabaseError, unix_timestamp};

use super::db::VaultDatabase;
use super::models::{NewSigningLog, SigningLog};

impl VaultDatabase {
    /// Whether (serial, fingerprint) has been signed before.
    pub async fn signing_log_exists(
        &self,
        serial_number: &str,
        fingerprint: &str,
    ) -> Result<bool, DatabaseError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM signinglog WHERE serial_number = ? AND fingerprint = ?)",
        )
        .bind(serial_number)
        .bind(fingerprint)
        .fetch_one(self.pool())
        .await?;

        Ok(row.0 != 0)
    }

    /// Append a signing-log entry.
    ///
    /// Fails with [`DatabaseError::UniqueViolation`] when the (serial,
    /// fingerprint) pair is already present.
    pub async fn insert_signing_log(&self, entry: &NewSigningLog) -> Result<SigningLog, DatabaseError> {
        let log = sqlx::query_as::<_, SigningLog>(
            "INSERT INTO signinglog (make, model, serial_number, fingerprint, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&entry.make)
        .bind(&entry.model)
        .bind(&entry.serial_number)
        .bind(&entry.fingerprint)
        .bind(unix_timestamp())
        .fetch_one(self.pool())
        .await?;

        Ok(log)
    }

    /// Most recent entries first.
    pub async fn list_signing_logs(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SigningLog>, DatabaseError> {
        Ok(sqlx::query_as::<_, SigningLog>(
            "SELECT * FROM signinglog ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?)
    }

    pub async fn count_signing_logs(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signinglog")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }
}
