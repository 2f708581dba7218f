//! Model and keypair queries.

use serialvault_core::db::unix_timestamp;
use sqlx::{QueryBuilder, Sqlite};

use super::db::VaultDatabase;
use super::models::{Keypair, Model, NewModel};
use super::scope::Scope;
use serialvault_core::db::DatabaseError;

const SELECT_MODEL: &str = "SELECT m.id, m.brand_id, m.name, m.revision, m.keypair_id, \
     k.authority_id, k.key_id, k.sealed_key, k.active AS key_active \
     FROM model m INNER JOIN keypair k ON k.id = m.keypair_id WHERE 1 = 1";

fn duplicate_model(new: &NewModel, err: DatabaseError) -> DatabaseError {
    match err {
        DatabaseError::UniqueViolation(_) => DatabaseError::DuplicateModel {
            brand_id: new.brand_id.clone(),
            name: new.name.clone(),
            revision: new.revision,
        },
        DatabaseError::ForeignKey(_) => {
            DatabaseError::NotFound(format!("Keypair {}", new.keypair_id))
        }
        other => other,
    }
}

impl VaultDatabase {
    // =========================================================================
    // Keypair queries
    // =========================================================================

    /// Store a signing keypair.
    pub async fn create_keypair(
        &self,
        authority_id: &str,
        key_id: &str,
        sealed_key: &[u8],
    ) -> Result<Keypair, DatabaseError> {
        let id = sqlx::query(
            "INSERT INTO keypair (authority_id, key_id, sealed_key, active, created_at) VALUES (?, ?, ?, 1, ?)",
        )
        .bind(authority_id)
        .bind(key_id)
        .bind(sealed_key)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?
        .last_insert_rowid();

        self.get_keypair(id).await
    }

    pub async fn get_keypair(&self, id: i64) -> Result<Keypair, DatabaseError> {
        sqlx::query_as::<_, Keypair>("SELECT * FROM keypair WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Keypair {id}")))
    }

    /// Enable or disable a keypair for signing.
    pub async fn set_keypair_active(&self, id: i64, active: bool) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE keypair SET active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Keypair {id}")));
        }
        Ok(())
    }

    // =========================================================================
    // Model queries
    // =========================================================================

    /// List models visible in `scope`.
    pub async fn list_models(&self, scope: &Scope) -> Result<Vec<Model>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_MODEL);
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push("m.brand_id");
        });
        qb.push(" ORDER BY m.brand_id, m.name, m.revision");

        Ok(qb.build_query_as::<Model>().fetch_all(self.pool()).await?)
    }

    /// Get a model by ID.
    pub async fn get_model(&self, id: i64, scope: &Scope) -> Result<Model, DatabaseError> {
        self.find_model_by_id(id, scope)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Model {id}")))
    }

    pub async fn find_model_by_id(
        &self,
        id: i64,
        scope: &Scope,
    ) -> Result<Option<Model>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_MODEL);
        qb.push(" AND m.id = ");
        qb.push_bind(id);
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push("m.brand_id");
        });

        Ok(qb
            .build_query_as::<Model>()
            .fetch_optional(self.pool())
            .await?)
    }

    /// Find a model by its canonical (brand, name, revision).
    pub async fn find_model(
        &self,
        brand_id: &str,
        name: &str,
        revision: i64,
        scope: &Scope,
    ) -> Result<Option<Model>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_MODEL);
        qb.push(" AND m.brand_id = ");
        qb.push_bind(brand_id.to_string());
        qb.push(" AND m.name = ");
        qb.push_bind(name.to_string());
        qb.push(" AND m.revision = ");
        qb.push_bind(revision);
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push("m.brand_id");
        });

        Ok(qb
            .build_query_as::<Model>()
            .fetch_optional(self.pool())
            .await?)
    }

    /// Create a model. Under a user scope the brand must belong to one of
    /// the user's accounts.
    pub async fn create_model(&self, new: &NewModel, scope: &Scope) -> Result<Model, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO model (brand_id, name, revision, keypair_id, created_at) SELECT ",
        );
        let mut values = qb.separated(", ");
        values.push_bind(new.brand_id.clone());
        values.push_bind(new.name.clone());
        values.push_bind(new.revision);
        values.push_bind(new.keypair_id);
        values.push_bind(unix_timestamp());
        qb.push(" WHERE 1 = 1");
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push_bind(new.brand_id.clone());
        });

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| duplicate_model(new, e.into()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Account for brand {}",
                new.brand_id
            )));
        }

        self.get_model(result.last_insert_rowid(), &Scope::Unscoped)
            .await
    }

    /// Update a model's brand, name, revision and keypair.
    pub async fn update_model(
        &self,
        id: i64,
        new: &NewModel,
        scope: &Scope,
    ) -> Result<Model, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE model SET brand_id = ");
        qb.push_bind(new.brand_id.clone());
        qb.push(", name = ");
        qb.push_bind(new.name.clone());
        qb.push(", revision = ");
        qb.push_bind(new.revision);
        qb.push(", keypair_id = ");
        qb.push_bind(new.keypair_id);
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        // Both the current and the new brand must be reachable.
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push("model.brand_id");
        });
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push_bind(new.brand_id.clone());
        });

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| duplicate_model(new, e.into()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Model {id}")));
        }

        self.get_model(id, &Scope::Unscoped).await
    }

    /// Delete a model.
    pub async fn delete_model(&self, id: i64, scope: &Scope) -> Result<(), DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM model WHERE id = ");
        qb.push_bind(id);
        scope.push_brand_filter(&mut qb, |qb| {
            qb.push("model.brand_id");
        });

        let result = qb.build().execute(self.pool()).await.map_err(|e| {
            match DatabaseError::from(e) {
                DatabaseError::ForeignKey(_) => DatabaseError::ForeignKey(format!(
                    "Model {id} is still referenced by sub-store mappings"
                )),
                other => other,
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Model {id}")));
        }
        Ok(())
    }
}
