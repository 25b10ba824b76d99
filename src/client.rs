//! HTTP client for a running stacktrack server.
//!
//! The CLI uses this to read and reorder stacks without touching the database
//! directly. The base URL comes from `STACKTRACK_URL` (see
//! [`crate::config::Config`]).

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::ApiResponse;
use crate::models::*;
use crate::stack::StackVerification;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct StackClient {
    base_url: String,
    client: Client,
}

impl StackClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Unwrap the response envelope, converting error statuses to [`ClientError`].
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            let envelope: ApiResponse<T> = response.json().await?;
            return envelope.data.ok_or_else(|| {
                ClientError::Server(envelope.error.unwrap_or_else(|| "Empty response".into()))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or(body);

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(message)),
            _ => Err(ClientError::Server(format!("{}: {}", status, message))),
        }
    }

    // ============================================================
    // Project Operations
    // ============================================================

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ClientError> {
        let response = self.request(Method::GET, "/projects").send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Feature Operations
    // ============================================================

    /// Get a feature together with its branches and base branch.
    pub async fn get_feature(
        &self,
        project_id: i64,
        feature_id: i64,
    ) -> Result<FeatureWithBranches, ClientError> {
        let response = self
            .request(
                Method::GET,
                &format!("/projects/{}/features/{}", project_id, feature_id),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn verify_stack(
        &self,
        project_id: i64,
        feature_id: i64,
    ) -> Result<StackVerification, ClientError> {
        let response = self
            .request(
                Method::GET,
                &format!(
                    "/projects/{}/features/{}/verify-stack",
                    project_id, feature_id
                ),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Branch Operations
    // ============================================================

    /// Replace the stack order. Returns the feature's branches afterwards.
    pub async fn reorder_branches(
        &self,
        project_id: i64,
        feature_id: i64,
        ordered_ids: Vec<i64>,
    ) -> Result<Vec<Branch>, ClientError> {
        let response = self
            .request(
                Method::PUT,
                &format!(
                    "/projects/{}/features/{}/branches/reorder",
                    project_id, feature_id
                ),
            )
            .json(&ReorderBranchesInput { ordered_ids })
            .send()
            .await?;
        self.handle_response(response).await
    }
}
