//! Error taxonomy shared by the service and route layers.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::machine::InvalidTransition;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input provided by the client; no state was touched.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested lobby or player was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Host-only or role-only action attempted by an ineligible caller.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Duplicate vote submitted in the same round.
    #[error("player has already voted in this round")]
    AlreadyVoted,
    /// Game start attempted below the minimum roster size.
    #[error("at least {need} players are required to start (have {have})")]
    InsufficientPlayers {
        /// Current roster size.
        have: usize,
        /// Minimum roster size for a meaningful vote.
        need: usize,
    },
    /// Operation cannot be performed in the current lobby phase.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Stored entities reference each other inconsistently.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller is not allowed to perform the action.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::AlreadyVoted => AppError::Conflict(err.to_string()),
            ServiceError::InsufficientPlayers { .. } => AppError::BadRequest(err.to_string()),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
