//! Extractors whose rejections are rendered as the response envelope.
//!
//! axum's own `Path`, `Query` and `Json` reject with a plain-text body. These
//! wrappers turn every rejection into a `400` [`ApiError`] so clients always
//! receive `{ "data": null, "error": ... }`.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::response::ApiError;

/// Path parameters, e.g. the numeric ids in `/projects/{project_id}`.
pub struct ApiPath<T>(pub T);

/// Query string parameters.
pub struct ApiQuery<T>(pub T);

/// JSON request body.
pub struct ApiJson<T>(pub T);

fn rejected(what: &str, rejection: impl std::fmt::Display) -> ApiError {
    tracing::warn!("Rejected {}: {}", what, rejection);
    ApiError::bad_request(format!("Invalid {}: {}", what, rejection))
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| Self(value))
            .map_err(|e| rejected("path parameter", e))
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Query(value)| Self(value))
            .map_err(|e| rejected("query string", e))
    }
}

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Self(value))
            .map_err(|e| rejected("request body", e))
    }
}
