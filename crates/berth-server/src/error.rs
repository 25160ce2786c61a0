//! API error taxonomy and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use berth_api_types::ErrorResponse;
use thiserror::Error;

use crate::daemon::{DaemonError, ResourceKind};
use crate::provision::ProvisionError;

/// Result type alias for orchestration operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, rejected before any daemon call.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{kind} not found")]
    NotFound { kind: ResourceKind, id: String },

    /// Volume usage guard.
    #[error("{kind} is in use and cannot be deleted")]
    ResourceInUse { kind: ResourceKind, id: String },

    /// The daemon refused the operation in the object's current state.
    #[error("{kind} {id} cannot be changed in its current state: {message}")]
    ConflictState {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("Failed to run image: {0}")]
    ProvisioningFailed(#[from] ProvisionError),

    #[error("Container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::ResourceInUse { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ConflictState { .. } => StatusCode::CONFLICT,
            Self::ProvisioningFailed(_) | Self::RuntimeUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map a daemon failure for `op` on the object `kind`/`id`, logging it
    /// with the operation context first.
    pub fn from_daemon(op: &'static str, kind: ResourceKind, id: &str, err: DaemonError) -> Self {
        tracing::error!(op, kind = %kind, id, error = %err, "daemon call failed");
        match err {
            DaemonError::NotFound(_) => Self::NotFound {
                kind,
                id: id.to_string(),
            },
            DaemonError::Conflict(message) => Self::ConflictState {
                kind,
                id: id.to_string(),
                message,
            },
            DaemonError::Unavailable(message) => Self::RuntimeUnavailable(message),
            DaemonError::Status { .. } => Self::Internal(format!("Failed to {op}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
