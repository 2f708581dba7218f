//! Version and health endpoints. Neither requires authentication.

use axum::extract::State;
use serde::Serialize;

use super::AppState;
use super::response::{ApiError, ApiResponse};

#[derive(Debug, Serialize)]
pub struct VersionPayload {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub database: &'static str,
}

/// `GET /v1/version`
pub async fn version() -> ApiResponse<VersionPayload> {
    ApiResponse::ok(VersionPayload {
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /v1/health`
pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<HealthPayload>, ApiError> {
    state.db().health_check().await?;
    Ok(ApiResponse::ok(HealthPayload { database: "ok" }))
}
