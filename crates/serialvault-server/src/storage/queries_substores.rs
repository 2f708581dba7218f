//! Sub-store mapping queries.

use serialvault_core::db::DatabaseError;
use sqlx::{QueryBuilder, Sqlite};

use super::db::VaultDatabase;
use super::models::{NewSubstore, Substore, SubstoreDetail};
use super::scope::Scope;

const SELECT_SUBSTORE: &str = "SELECT s.id, s.account_id, s.from_model_id, s.store, \
     s.serial_number, s.model_name FROM substore s WHERE 1 = 1";

/// Translate constraint failures into errors naming the offending mapping.
fn mapping_error(new: &NewSubstore, err: DatabaseError) -> DatabaseError {
    match err {
        DatabaseError::UniqueViolation(_) => DatabaseError::DuplicateMapping {
            from_model_id: new.from_model_id,
            serial_number: new.serial_number.clone(),
            store: new.store.clone(),
        },
        DatabaseError::ForeignKey(_) => DatabaseError::NotFound(format!(
            "Account {} or model {}",
            new.account_id, new.from_model_id
        )),
        other => other,
    }
}

impl VaultDatabase {
    /// Attach the originating model to each sub-store.
    async fn with_models(&self, stores: Vec<Substore>) -> Result<Vec<SubstoreDetail>, DatabaseError> {
        let mut details = Vec::with_capacity(stores.len());
        for substore in stores {
            let from_model = self
                .get_model(substore.from_model_id, &Scope::Unscoped)
                .await?
                .summary();
            details.push(SubstoreDetail {
                substore,
                from_model,
            });
        }
        Ok(details)
    }

    /// List the sub-stores of an account.
    pub async fn list_substores(
        &self,
        account_id: i64,
        scope: &Scope,
    ) -> Result<Vec<SubstoreDetail>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_SUBSTORE);
        qb.push(" AND s.account_id = ");
        qb.push_bind(account_id);
        scope.push_account_filter(&mut qb, |qb| {
            qb.push("s.account_id");
        });
        qb.push(" ORDER BY s.id");

        let stores = qb.build_query_as::<Substore>().fetch_all(self.pool()).await?;
        self.with_models(stores).await
    }

    /// Get a sub-store by ID with its originating model.
    pub async fn get_substore(&self, id: i64, scope: &Scope) -> Result<SubstoreDetail, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_SUBSTORE);
        qb.push(" AND s.id = ");
        qb.push_bind(id);
        scope.push_account_filter(&mut qb, |qb| {
            qb.push("s.account_id");
        });

        let store = qb
            .build_query_as::<Substore>()
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Sub-store {id}")))?;

        self.with_models(vec![store])
            .await?
            .pop()
            .ok_or_else(|| DatabaseError::NotFound(format!("Sub-store {id}")))
    }

    /// Find every mapping that lets `serial_number` be addressed as
    /// `model_name` under `brand_id`.
    pub async fn find_substores_by_pivot(
        &self,
        brand_id: &str,
        model_name: &str,
        serial_number: &str,
        scope: &Scope,
    ) -> Result<Vec<Substore>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT s.id, s.account_id, s.from_model_id, s.store, s.serial_number, s.model_name \
             FROM substore s INNER JOIN model m ON m.id = s.from_model_id WHERE m.brand_id = ",
        );
        qb.push_bind(brand_id.to_string());
        qb.push(" AND s.model_name = ");
        qb.push_bind(model_name.to_string());
        qb.push(" AND s.serial_number = ");
        qb.push_bind(serial_number.to_string());
        scope.push_account_filter(&mut qb, |qb| {
            qb.push("s.account_id");
        });
        qb.push(" ORDER BY s.id");

        Ok(qb
            .build_query_as::<Substore>()
            .fetch_all(self.pool())
            .await?)
    }

    /// Create a sub-store mapping. Under a user scope the target account
    /// must be linked to the user.
    pub async fn create_substore(
        &self,
        new: &NewSubstore,
        scope: &Scope,
    ) -> Result<SubstoreDetail, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "INSERT INTO substore (account_id, from_model_id, store, serial_number, model_name) SELECT ",
        );
        let mut values = qb.separated(", ");
        values.push_bind(new.account_id);
        values.push_bind(new.from_model_id);
        values.push_bind(new.store.clone());
        values.push_bind(new.serial_number.clone());
        values.push_bind(new.model_name.clone());
        qb.push(" WHERE 1 = 1");
        scope.push_account_filter(&mut qb, |qb| {
            qb.push_bind(new.account_id);
        });

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| mapping_error(new, e.into()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Account {}", new.account_id)));
        }

        self.get_substore(result.last_insert_rowid(), &Scope::Unscoped)
            .await
    }

    /// Replace every field of a sub-store mapping.
    pub async fn update_substore(
        &self,
        id: i64,
        new: &NewSubstore,
        scope: &Scope,
    ) -> Result<SubstoreDetail, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE substore SET account_id = ");
        qb.push_bind(new.account_id);
        qb.push(", from_model_id = ");
        qb.push_bind(new.from_model_id);
        qb.push(", store = ");
        qb.push_bind(new.store.clone());
        qb.push(", serial_number = ");
        qb.push_bind(new.serial_number.clone());
        qb.push(", model_name = ");
        qb.push_bind(new.model_name.clone());
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        scope.push_account_filter(&mut qb, |qb| {
            qb.push("substore.account_id");
        });
        scope.push_account_filter(&mut qb, |qb| {
            qb.push_bind(new.account_id);
        });

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| mapping_error(new, e.into()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Sub-store {id}")));
        }

        self.get_substore(id, &Scope::Unscoped).await
    }

    /// Delete a sub-store mapping.
    pub async fn delete_substore(&self, id: i64, scope: &Scope) -> Result<(), DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM substore WHERE id = ");
        qb.push_bind(id);
        scope.push_account_filter(&mut qb, |qb| {
            qb.push("substore.account_id");
        });

        let result = qb.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Sub-store {id}")));
        }
        Ok(())
    }
}
