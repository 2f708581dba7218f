//! Account and user queries backing scoped access.

use serialvault_core::db::DatabaseError;

use super::db::VaultDatabase;
use super::models::{Account, User};

impl VaultDatabase {
    /// Create an account owning the given brand.
    pub async fn create_account(
        &self,
        authority_id: &str,
        name: &str,
    ) -> Result<Account, DatabaseError> {
        let id = sqlx::query("INSERT INTO account (authority_id, name) VALUES (?, ?)")
            .bind(authority_id)
            .bind(name)
            .execute(self.pool())
            .await?
            .last_insert_rowid();

        self.get_account(id).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Account, DatabaseError> {
        sqlx::query_as::<_, Account>("SELECT * FROM account WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Account {id}")))
    }

    /// Create a user with the given role (see [`super::models::role`]).
    pub async fn create_user(
        &self,
        username: &str,
        name: &str,
        role: i64,
    ) -> Result<User, DatabaseError> {
        sqlx::query("INSERT INTO userinfo (username, name, role) VALUES (?, ?, ?)")
            .bind(username)
            .bind(name)
            .bind(role)
            .execute(self.pool())
            .await?;

        self.get_user_by_username(username)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with username {username}")))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM userinfo WHERE username = ?")
                .bind(username)
                .fetch_optional(self.pool())
                .await?,
        )
    }

    /// Grant a user access to an account.
    pub async fn link_user_account(&self, user_id: i64, account_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("INSERT OR IGNORE INTO useraccountlink (user_id, account_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(account_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
