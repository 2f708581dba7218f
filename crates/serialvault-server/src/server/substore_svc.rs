//! Sub-store administration endpoints.

use axum::extract::State;
use serde::Serialize;
use tracing::{info, instrument};

use super::extract::{ApiJson, ApiPath};
use super::response::{ApiError, ApiResponse};
use super::validation::validate_substore;
use super::{AdminScope, AppState};
use crate::storage::{NewSubstore, SubstoreDetail};

#[derive(Debug, Serialize)]
pub struct SubstoresPayload {
    pub substores: Vec<SubstoreDetail>,
}

#[derive(Debug, Serialize)]
pub struct SubstorePayload {
    pub substore: SubstoreDetail,
}

/// `GET /v1/accounts/{id}/stores`
#[instrument(skip_all, fields(route = "ListSubstores"))]
pub async fn list(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(account_id): ApiPath<i64>,
) -> Result<ApiResponse<SubstoresPayload>, ApiError> {
    let substores = state.db().list_substores(account_id, &scope).await?;
    Ok(ApiResponse::ok(SubstoresPayload { substores }))
}

/// `GET /v1/stores/{id}`
#[instrument(skip_all, fields(route = "GetSubstore"))]
pub async fn get(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<SubstorePayload>, ApiError> {
    let substore = state.db().get_substore(id, &scope).await?;
    Ok(ApiResponse::ok(SubstorePayload { substore }))
}

/// `POST /v1/stores`
#[instrument(skip_all, fields(route = "CreateSubstore"))]
pub async fn create(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiJson(new): ApiJson<NewSubstore>,
) -> Result<ApiResponse<SubstorePayload>, ApiError> {
    validate_substore(&new)?;
    let substore = state.db().create_substore(&new, &scope).await?;
    info!(
        substore_id = substore.substore.id,
        account_id = new.account_id,
        serial = %new.serial_number,
        "Sub-store created"
    );
    Ok(ApiResponse::ok(SubstorePayload { substore }))
}

/// `PUT /v1/stores/{id}`
#[instrument(skip_all, fields(route = "UpdateSubstore"))]
pub async fn update(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(id): ApiPath<i64>,
    ApiJson(new): ApiJson<NewSubstore>,
) -> Result<ApiResponse<SubstorePayload>, ApiError> {
    validate_substore(&new)?;
    let substore = state.db().update_substore(id, &new, &scope).await?;
    info!(substore_id = id, "Sub-store updated");
    Ok(ApiResponse::ok(SubstorePayload { substore }))
}

/// `DELETE /v1/stores/{id}`
#[instrument(skip_all, fields(route = "DeleteSubstore"))]
pub async fn delete(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<SubstorePayload>, ApiError> {
    let substore = state.db().get_substore(id, &scope).await?;
    state.db().delete_substore(id, &scope).await?;
    info!(substore_id = id, "Sub-store deleted");
    Ok(ApiResponse::ok(SubstorePayload { substore }))
}
