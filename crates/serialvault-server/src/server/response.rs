//! The response envelope shared by every endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serialvault_core::ErrorKind;
use tracing::error;

use crate::auth::AuthError;
use crate::signing::SignError;
use crate::storage::DatabaseError;

/// `{success, error_code, error_subcode, message, ...payload}`.
///
/// The payload's fields are flattened into the envelope, so a
/// `ApiResponse<ModelPayload>` serializes with a top-level `model` field.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub error_code: String,
    pub error_subcode: String,
    pub message: String,
    #[serde(flatten)]
    pub payload: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub const fn ok(payload: T) -> Self {
        Self {
            success: true,
            error_code: String::new(),
            error_subcode: String::new(),
            message: String::new(),
            payload: Some(payload),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A failed request, already classified.
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: ErrorKind,
    subcode: Option<&'static str>,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            subcode: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn with_subcode(mut self, subcode: &'static str) -> Self {
        self.subcode = Some(subcode);
        self
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::ResolutionFailure | ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::SigningFailure | ErrorKind::PersistenceFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::<()> {
            success: false,
            error_code: self.kind.code().to_string(),
            error_subcode: self.subcode.unwrap_or_default().to_string(),
            message: self.message,
            payload: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<SignError> for ApiError {
    fn from(e: SignError) -> Self {
        let api = Self::new(e.kind(), e.to_string());
        match e.subcode() {
            Some(subcode) => api.with_subcode(subcode),
            None => api,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Storage(e) => e.into(),
            other => Self::new(ErrorKind::Auth, other.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::new(ErrorKind::NotFound, format!("{what} not found")),
            e @ (DatabaseError::DuplicateModel { .. } | DatabaseError::DuplicateMapping { .. }) => {
                Self::new(ErrorKind::UniquenessViolation, e.to_string())
            }
            DatabaseError::UniqueViolation(_) => {
                Self::new(ErrorKind::UniquenessViolation, "The record already exists")
            }
            DatabaseError::ForeignKey(what) => Self::new(ErrorKind::MalformedInput, what),
            other => {
                error!(error = %other, "database failure");
                Self::new(ErrorKind::PersistenceFailure, "Error accessing the database")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        thing: u32,
    }

    #[test]
    fn payload_fields_are_flattened() {
        let json = serde_json::to_value(ApiResponse::ok(Payload { thing: 7 })).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["error_code"], "");
        assert_eq!(json["thing"], 7);
    }

    #[test]
    fn statuses_follow_kind() {
        assert_eq!(
            ApiError::new(ErrorKind::Auth, "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::new(ErrorKind::ResolutionFailure, "x").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::new(ErrorKind::PersistenceFailure, "x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::new(ErrorKind::UniquenessViolation, "x").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn duplicate_mapping_message_names_the_tuple() {
        let err: ApiError = DatabaseError::DuplicateMapping {
            from_model_id: 3,
            serial_number: "S1".into(),
            store: "shop".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UniquenessViolation);
        assert!(err.message().contains("(3, S1, shop)"));
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let err: ApiError = DatabaseError::Connection("/var/lib/secret.db locked".into()).into();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(!err.message().contains("secret"));
    }

    #[tokio::test]
    async fn error_renders_status_and_envelope() {
        let response = ApiError::from(SignError::InactiveModel).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], ErrorKind::InactiveModel.code());
        assert_eq!(
            json["message"],
            "The model is linked with an inactive signing-key"
        );
    }

    #[test]
    fn conflict_keeps_subcode() {
        let err: ApiError = SignError::Conflict.into();
        assert_eq!(err.kind(), ErrorKind::DuplicateAssertion);
        assert_eq!(err.subcode, Some("conflict"));
    }
}
