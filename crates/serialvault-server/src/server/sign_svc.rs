//! `POST /v1/serial`: sign a serial assertion.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;

use super::response::{ApiError, ApiResponse};
use super::{AppState, header};
use crate::signing::SerialRequest;

#[derive(Debug, Serialize)]
pub struct IdentityPayload {
    /// The signed assertion, as produced by the signing authority.
    pub identity: String,
}

pub async fn sign_serial(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<IdentityPayload>, ApiError> {
    let signed = state
        .vault
        .sign_serial(SerialRequest {
            api_key: header(&headers, "api-key"),
            payload: &body,
        })
        .await?;

    Ok(ApiResponse::ok(IdentityPayload {
        identity: String::from_utf8_lossy(&signed.assertion).into_owned(),
    }))
}
