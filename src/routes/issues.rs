//! Issue listing endpoint.
//!
//! GET /repos/{id}/issues
//!
//! Returns GitHub's issue list for a tracked repository unchanged. When GitHub
//! answers with anything but 200 the body is `{ "error": ... }` with a 502.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::IssueFetch;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{id}/issues", get(get_issues))
        .with_state(state)
}

async fn get_issues(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let row = state.store.get(id).await?.ok_or(AppError::RepoNotFound(id))?;
    let repo = row.repository()?;

    let response = match state.github.fetch_issues(&repo).await? {
        issues @ IssueFetch::Issues(_) => Json(issues).into_response(),
        failed @ IssueFetch::Failed(_) => (StatusCode::BAD_GATEWAY, Json(failed)).into_response(),
    };
    Ok(response)
}
