//! HTTP API for the vault.

pub mod extract;
pub mod health;
pub mod model_svc;
pub mod response;
pub mod sign_svc;
pub mod signing_log_svc;
pub mod substore_svc;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::routing::{get, post};

use crate::auth::resolve_admin_scope;
use crate::signing::VaultContext;
use crate::storage::{Scope, VaultDatabase};

pub use response::{ApiError, ApiResponse};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<VaultContext<VaultDatabase>>,
}

impl AppState {
    pub fn new(vault: VaultContext<VaultDatabase>) -> Self {
        Self {
            vault: Arc::new(vault),
        }
    }

    pub fn db(&self) -> &VaultDatabase {
        self.vault.store()
    }
}

pub(crate) fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Scope of an authenticated administration request.
#[derive(Debug, Clone)]
pub struct AdminScope(pub Scope);

impl FromRequestParts<AppState> for AdminScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let scope = resolve_admin_scope(
            state.db(),
            state.vault.config(),
            header(&parts.headers, "api-key"),
            header(&parts.headers, "user"),
        )
        .await?;
        Ok(Self(scope))
    }
}

/// Build the `/v1` router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/version", get(health::version))
        .route("/v1/health", get(health::health))
        .route("/v1/serial", post(sign_svc::sign_serial))
        .route("/v1/models", get(model_svc::list).post(model_svc::create))
        .route(
            "/v1/models/{id}",
            get(model_svc::get)
                .put(model_svc::update)
                .delete(model_svc::delete),
        )
        .route("/v1/accounts/{id}/stores", get(substore_svc::list))
        .route("/v1/stores", post(substore_svc::create))
        .route(
            "/v1/stores/{id}",
            get(substore_svc::get)
                .put(substore_svc::update)
                .delete(substore_svc::delete),
        )
        .route("/v1/signinglog", get(signing_log_svc::list))
        .with_state(state)
}
