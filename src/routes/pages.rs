//! Server-rendered pages.
//!
//! - GET /                        Landing page
//! - GET /track, POST /track      Register a repository and show its contributors
//! - GET /repos/list              Tracked repositories with refresh/delete actions
//! - GET /repos/{id}/metrics      Contributor chart for one repository
//! - POST /repos/{id}/delete      Stop tracking, then show the list
//! - POST /repos/{id}/refresh     Recompute metrics, stamp `last_retrieved`, show the list
//!
//! Handlers call the aggregator and store directly instead of going through the
//! JSON API. Outcome messages are rendered into the returned page.

use axum::{
    Form, Router,
    extract::{Path, State},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use tera::Context;

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::RepositoryId;
use crate::registry;
use crate::report::MetricsChart;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/track", get(track_form).post(track_repo))
        .route("/repos/list", get(list_page))
        .route("/repos/{id}/metrics", get(metrics_page))
        .route("/repos/{id}/delete", post(delete_from_list))
        .route("/repos/{id}/refresh", post(refresh_from_list))
        .with_state(state)
}

#[derive(Clone, Copy)]
enum Level {
    Success,
    Warning,
    Danger,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }
}

fn with_notice(mut context: Context, level: Level, notice: impl AsRef<str>) -> Context {
    context.insert("notice", notice.as_ref());
    context.insert("level", level.as_str());
    context
}

fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>> {
    Ok(Html(state.views.render(template, context)?))
}

async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state, "index.html", &Context::new())
}

async fn track_form(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state, "track.html", &Context::new())
}

#[derive(Debug, Deserialize)]
struct TrackForm {
    #[serde(default)]
    repo_url: String,
}

async fn results_page(state: &AppState, repo: RepositoryId, context: Context) -> Result<Html<String>> {
    let metrics = state.github.fetch_metrics(std::slice::from_ref(&repo)).await;
    let charts: Vec<MetricsChart> = metrics.iter().map(MetricsChart::from).collect();

    let mut context = context;
    context.insert("repo_url", &repo.to_string());
    context.insert("metrics", &charts);
    render(state, "results.html", &context)
}

async fn track_repo(State(state): State<AppState>, Form(form): Form<TrackForm>) -> Result<Html<String>> {
    if form.repo_url.trim().is_empty() {
        let context = with_notice(Context::new(), Level::Danger, "Repository URL is required!");
        return render(&state, "track.html", &context);
    }

    match registry::register(&state.store, &state.github, &form.repo_url).await {
        Ok(row) => {
            let context = with_notice(Context::new(), Level::Success, "Repository added successfully!");
            results_page(&state, row.repository()?, context).await
        }
        Err(e @ AppError::InvalidRepository(_)) => {
            let context = with_notice(
                Context::new(),
                Level::Danger,
                format!("Failed to add repository: {}", e),
            );
            render(&state, "track.html", &context)
        }
        Err(e) => {
            tracing::error!(repo_url = %form.repo_url, "Error: {}", e);
            let context = with_notice(
                Context::new(),
                Level::Danger,
                "An unexpected error occurred. Please try again later.",
            );
            render(&state, "track.html", &context)
        }
    }
}

async fn list_with(state: &AppState, context: Context) -> Result<Html<String>> {
    let mut context = context;
    context.insert("repos", &state.store.list().await?);
    render(state, "repo_list.html", &context)
}

async fn list_page(State(state): State<AppState>) -> Result<Html<String>> {
    list_with(&state, Context::new()).await
}

async fn metrics_page(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Html<String>> {
    let row = state.store.get(id).await?.ok_or(AppError::RepoNotFound(id))?;
    results_page(&state, row.repository()?, Context::new()).await
}

async fn delete_from_list(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Html<String>> {
    let removed = match state.store.get(id).await? {
        Some(row) => state.store.delete(id).await?.then_some(row),
        None => None,
    };
    let context = match removed {
        Some(row) => with_notice(
            Context::new(),
            Level::Success,
            format!("Repository {} deleted successfully!", row.name),
        ),
        None => with_notice(Context::new(), Level::Warning, "Repository not found."),
    };
    list_with(&state, context).await
}

async fn refresh_from_list(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Html<String>> {
    let Some(row) = state.store.get(id).await? else {
        let context = with_notice(Context::new(), Level::Warning, "Repository not found.");
        return list_with(&state, context).await;
    };

    let repo = row.repository()?;
    let contributors = state.github.fetch_contributors(&repo).await;
    state.store.mark_retrieved(id).await?;
    tracing::info!(repo = %repo, contributors = contributors.len(), "Refreshed metrics");

    let context = with_notice(
        Context::new(),
        Level::Success,
        format!("Metrics for {} refreshed successfully!", row.name),
    );
    list_with(&state, context).await
}
