//! Resolves the access scope of an administration request.

use serialvault_core::config::SigningConfig;
use tracing::warn;

use super::api_key::check_api_key;
use crate::storage::{DatabaseError, Scope, VaultDatabase, role};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("The 'user' header is required")]
    MissingUser,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Error checking user")]
    Storage(#[from] DatabaseError),
}

/// Authenticate an admin caller and decide its scope.
///
/// Without user auth every valid key is administrative. With user auth the
/// `user` header picks a user: admins and superusers are unscoped, standard
/// users only see their own accounts.
pub async fn resolve_admin_scope(
    db: &VaultDatabase,
    config: &SigningConfig,
    api_key: Option<&str>,
    username: Option<&str>,
) -> Result<Scope, AuthError> {
    if !check_api_key(&config.api_keys, api_key) {
        return Err(AuthError::InvalidApiKey);
    }
    if !config.enable_user_auth {
        return Ok(Scope::Unscoped);
    }

    let username = username
        .filter(|u| !u.is_empty())
        .ok_or(AuthError::MissingUser)?;
    let Some(user) = db.get_user_by_username(username).await? else {
        warn!(%username, "admin request for unknown user");
        return Err(AuthError::UnknownUser);
    };

    match user.role {
        r if r >= role::ADMIN => Ok(Scope::Unscoped),
        r if r >= role::STANDARD => Ok(Scope::User(user.username)),
        _ => Err(AuthError::Forbidden),
    }
}
