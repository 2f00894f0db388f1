//! Tracked repository endpoints.
//!
//! - POST /repos { repo_url: string }
//!   Checks the repository exists on GitHub, then stores it. 201 with the new id.
//!
//! - GET /repos
//!   Lists every tracked repository.
//!
//! - DELETE /repos/{id}
//!   Stops tracking a repository. 404 if the id is unknown.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::TrackedRepo;
use crate::registry;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos", get(list_repos).post(add_repo))
        .route("/repos/{id}", delete(delete_repo))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AddRepoRequest {
    repo_url: Option<String>,
}

async fn add_repo(
    State(state): State<AppState>,
    Json(request): Json<AddRepoRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let repo_url = request
        .repo_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRepository("Repository URL is required.".to_string()))?;

    let repo = registry::register(&state.store, &state.github, &repo_url).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Repository {} added!", repo.full_name),
            "repo_id": repo.id,
        })),
    ))
}

async fn list_repos(State(state): State<AppState>) -> Result<Json<Vec<TrackedRepo>>> {
    Ok(Json(state.store.list().await?))
}

async fn delete_repo(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    if !state.store.delete(id).await? {
        return Err(AppError::RepoNotFound(id));
    }
    tracing::info!(id, "Stopped tracking repository");
    Ok(Json(json!({
        "message": format!("Repository {} deleted successfully.", id),
    })))
}
