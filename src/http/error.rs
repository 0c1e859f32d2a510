//! Mapping from domain errors to HTTP responses.
//!
//! Every failure is answered with `{"message": "..."}` and the status below.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::NotesError;

/// Error body sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// HTTP status for a domain error.
pub fn status_for(err: &NotesError) -> StatusCode {
    match err {
        NotesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        NotesError::InvalidId(_) | NotesError::NotFound(_) => StatusCode::NOT_FOUND,
        NotesError::Conflict(_) | NotesError::AlreadyInitialized(_) => StatusCode::CONFLICT,
        NotesError::Io(_) | NotesError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<NotesError> for ApiError {
    fn from(err: NotesError) -> Self {
        let status = status_for(&err);
        if err.is_internal() {
            error!(error = %err, "storage failure");
        }
        Self::new(status, err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!(error = %err, "blocking note operation did not complete");
        Self::internal("internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.status.is_server_error() {
            debug!(status = %self.status, message = %self.message, "request rejected");
        }
        let body = Json(ErrorBody {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
