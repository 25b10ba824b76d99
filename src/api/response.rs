//! Response envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::StackError;

/// `{ "data": ..., "error": ... }`: exactly one of the two is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body returned by delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
}

/// An error rendered as an envelope with the matching status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found", what),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

/// Log an internal error and return a sanitized response to the client.
///
/// Domain errors ([`StackError`]) describe a problem with the request and are
/// passed through; anything else is logged and reported generically.
pub fn internal_error(e: anyhow::Error) -> ApiError {
    match e.downcast_ref::<StackError>() {
        Some(StackError::InvalidInput(msg)) => {
            tracing::warn!("Validation error: {}", msg);
            ApiError::bad_request(msg.clone())
        }
        Some(StackError::NotFound(what)) => ApiError::not_found(what),
        None => {
            tracing::error!("Internal error: {:#}", e);
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Internal server error".to_string(),
            }
        }
    }
}
