//! HTTP route handlers.
//!
//! Each submodule defines routes for a feature area:
//! - `repos`: Tracked repository CRUD (POST/GET /repos, DELETE /repos/{id})
//! - `metrics`: Contributor rankings for every tracked repository (GET /metrics)
//! - `issues`: Issue listing passthrough (GET /repos/{id}/issues)
//! - `pages`: Server-rendered HTML pages
//! - `assets`: Embedded stylesheet under /static

pub mod assets;
pub mod issues;
pub mod metrics;
pub mod pages;
pub mod repos;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::config::Settings;
use crate::error::Result;
use crate::github::GithubClient;
use crate::store::RepoStore;
use crate::views::Views;

/// Shared handles every handler works through.
#[derive(Clone)]
pub struct AppState {
    pub store: RepoStore,
    pub github: GithubClient,
    pub views: Arc<Views>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            store: RepoStore::connect(&settings.database_url).await?,
            github: GithubClient::new(settings)?,
            views: Arc::new(Views::new()?),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repos::routes(state.clone()))
        .merge(metrics::routes(state.clone()))
        .merge(issues::routes(state.clone()))
        .merge(pages::routes(state))
        .route("/static/{*path}", get(assets::serve_static))
}
