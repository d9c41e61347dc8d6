//! Unified error handling for the admin API.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::LoyaltyError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loyalty operation failed.
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    /// Request body could not be read as JSON of the expected shape.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Loyalty(LoyaltyError::Validation(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Loyalty(LoyaltyError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Loyalty(LoyaltyError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::Loyalty(
                LoyaltyError::StoreUnavailable(_) | LoyaltyError::ImportInterrupted { .. },
            ) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Loyalty(LoyaltyError::IdentifierSpaceExhausted { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Loyalty(LoyaltyError::StoreUnavailable(_)) => {
                "Service temporarily unavailable".to_string()
            }
            Self::Loyalty(LoyaltyError::ImportInterrupted { imported, .. }) => format!(
                "Service temporarily unavailable; {imported} records were imported before the failure"
            ),
            _ => self.to_string(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
