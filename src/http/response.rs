//! Response bodies and the mapping from errors to HTTP status codes.
//!
//! This is the only place errors become protocol responses. Instrumentation
//! layers pass responses through untouched.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::work::{DurationError, WorkError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelloResponse {
    pub status: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkResponse {
    pub status: String,
    pub requested_ms: u64,
    pub actual_ms: u64,
    pub request_id: Option<String>,
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DurationError> for ApiError {
    fn from(err: DurationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<WorkError> for ApiError {
    fn from(err: WorkError) -> Self {
        match err {
            WorkError::Interrupted => ApiError::Internal("application interrupted".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
