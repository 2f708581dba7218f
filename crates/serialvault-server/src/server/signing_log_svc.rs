//! `GET /v1/signinglog`: read-only audit view for administrators.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serialvault_core::ErrorKind;

use super::extract::ApiQuery;
use super::response::{ApiError, ApiResponse};
use super::{AdminScope, AppState};
use crate::storage::{Scope, SigningLog};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LogsPayload {
    pub logs: Vec<SigningLog>,
    pub total: i64,
}

pub async fn list(
    State(state): State<AppState>,
    AdminScope(scope): AdminScope,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<ApiResponse<LogsPayload>, ApiError> {
    // The log is not partitioned by account.
    if scope != Scope::Unscoped {
        return Err(ApiError::new(ErrorKind::Auth, "Insufficient permissions"));
    }

    let limit = page.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let logs = state
        .db()
        .list_signing_logs(limit, page.offset.unwrap_or(0))
        .await?;
    let total = state.db().count_signing_logs().await?;
    Ok(ApiResponse::ok(LogsPayload { logs, total }))
}
