//! Error taxonomy and its HTTP mapping.
//!
//! Every failure surfaces to the caller as a JSON body with a single
//! human-readable `error` string. Vendor detail is passed through only for
//! provider failures; storage and internal errors are logged and collapsed
//! to a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::IllegalTransition;

/// Failure of an external measurement provider call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider answered, but the payload is missing the result object
    /// the adapter needs.
    #[error("{0}")]
    MalformedResponse(String),
    /// Transport-level failure or a non-success vendor status; carries the
    /// vendor's status and message when available.
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid request input.
    #[error("{0}")]
    Validation(String),
    /// Missing, invalid, or expired credential, or a role the route rejects.
    #[error("{0}")]
    Auth(String),
    /// Refresh credential rejected.
    #[error("{0}")]
    Forbidden(String),
    /// Record absent or owned by someone else; the two are indistinguishable
    /// to the caller.
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Database(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl From<IllegalTransition> for ApiError {
    fn from(err: IllegalTransition) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Provider(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Database(err) => {
                error!("store failure: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            ApiError::Internal(msg) => {
                error!("internal failure: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
