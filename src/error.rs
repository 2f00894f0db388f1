//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` for every failure surfaced to an HTTP or CLI caller and
//! implements Axum's `IntoResponse` to turn it into a JSON error body.
//! `FetchError` is the narrower taxonomy of the contributor aggregator, which
//! never lets it escape `GithubClient::fetch_contributors`.
//!
//! Error mappings:
//! - `InvalidRepository` → 400
//! - `RepoNotFound` → 404
//! - `Github` → 502
//! - `Database`, `Template`, `Internal` → 500

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRepository(String),

    #[error("Repository not found.")]
    RepoNotFound(i64),

    #[error("GitHub request failed: {0}")]
    Github(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRepository(_) => StatusCode::BAD_REQUEST,
            AppError::RepoNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Github(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Why a contributor lookup produced no data.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("GitHub API token not found. Set GH_API_TOKEN in your environment.")]
    MissingToken,

    #[error("GitHub API rate limit exceeded. Ensure your token has sufficient quota.")]
    RateLimited,

    #[error("GitHub API error: {0}")]
    Upstream(reqwest::StatusCode),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}
