//! `SQLite` database for the vault server.

use std::path::Path;

use serialvault_core::db::{DatabaseError, open_pool, open_pool_in_memory};
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Handle to the vault database. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct VaultDatabase {
    pool: Pool<Sqlite>,
}

impl VaultDatabase {
    /// Open or create a database at the given path and run migrations.
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = open_pool(path, max_connections).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = open_pool_in_memory().await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Vault database migrations complete");
        Ok(())
    }

    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Round-trip a trivial query to prove the database is reachable.
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
