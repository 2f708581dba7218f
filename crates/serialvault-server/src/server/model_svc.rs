//! Model administration endpoints.

use axum::extract::State;
use serde::Serialize;
use tracing::{info, instrument};

use super::extract::{ApiJson, ApiPath};
use super::response::{ApiError, ApiResponse};
use super::validation::validate_model;
use super::{AdminScope, AppState};
use crate::storage::{ModelSummary, NewModel};

#[derive(Debug, Serialize)]
pub struct ModelsPayload {
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Serialize)]
pub struct ModelPayload {
    pub model: ModelSummary,
}

/// `GET /v1/models`
#[instrument(skip_all, fields(route = "ListModels"))]
pub async fn list(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
) -> Result<ApiResponse<ModelsPayload>, ApiError> {
    let models = state.db().list_models(&scope).await?;
    Ok(ApiResponse::ok(ModelsPayload {
        models: models.iter().map(|m| m.summary()).collect(),
    }))
}

/// `GET /v1/models/{id}`
#[instrument(skip_all, fields(route = "GetModel"))]
pub async fn get(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<ModelPayload>, ApiError> {
    let model = state.db().get_model(id, &scope).await?;
    Ok(ApiResponse::ok(ModelPayload {
        model: model.summary(),
    }))
}

/// `POST /v1/models`
#[instrument(skip_all, fields(route = "CreateModel"))]
pub async fn create(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiJson(new): ApiJson<NewModel>,
) -> Result<ApiResponse<ModelPayload>, ApiError> {
    validate_model(&new)?;
    let model = state.db().create_model(&new, &scope).await?;
    info!(model_id = model.id, brand = %model.brand_id, name = %model.name, "Model created");
    Ok(ApiResponse::ok(ModelPayload {
        model: model.summary(),
    }))
}

/// `PUT /v1/models/{id}`
#[instrument(skip_all, fields(route = "UpdateModel"))]
pub async fn update(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(id): ApiPath<i64>,
    ApiJson(new): ApiJson<NewModel>,
) -> Result<ApiResponse<ModelPayload>, ApiError> {
    validate_model(&new)?;
    let model = state.db().update_model(id, &new, &scope).await?;
    info!(model_id = id, "Model updated");
    Ok(ApiResponse::ok(ModelPayload {
        model: model.summary(),
    }))
}

/// `DELETE /v1/models/{id}`
#[instrument(skip_all, fields(route = "DeleteModel"))]
pub async fn delete(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<ModelPayload>, ApiError> {
    let model = state.db().get_model(id, &scope).await?;
    state.db().delete_model(id, &scope).await?;
    info!(model_id = id, "Model deleted");
    Ok(ApiResponse::ok(ModelPayload {
        model: model.summary(),
    }))
}
