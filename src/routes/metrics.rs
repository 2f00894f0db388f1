use axum::{Json, Router, extract::State, routing::get};

use super::AppState;
use crate::error::Result;
use crate::models::{RepositoryId, RepositoryMetrics};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Recomputes contributor rankings for every tracked repository.
async fn get_metrics(State(state): State<AppState>) -> Result<Json<Vec<RepositoryMetrics>>> {
    let repos = state
        .store
        .list()
        .await?
        .iter()
        .map(|row| row.repository())
        .collect::<Result<Vec<RepositoryId>>>()?;

    Ok(Json(state.github.fetch_metrics(&repos).await))
}
