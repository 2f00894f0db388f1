//! GitHub REST client for contributor and issue lookups.
//!
//! - `fetch_contributors`: top 10 commit authors of the last 90 days, empty on any failure
//! - `fetch_metrics`: `fetch_contributors` for many repositories at once, input order kept
//! - `fetch_issues`: issue list passed through, or an error record on non-200
//! - `check_repository`: existence check used before a repository is tracked
//!
//! Only the first page of each listing is read.

use chrono::Utc;
use futures::future::join_all;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use super::aggregate::{CommitEntry, rank_contributors, window_start};
use crate::config::Settings;
use crate::error::{AppError, FetchError, Result};
use crate::models::{ContributionRecord, IssueError, IssueFetch, RepositoryId, RepositoryMetrics};

const USER_AGENT: &str = concat!("engagetrack/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: settings.github_api_url.trim_end_matches('/').to_string(),
            token: settings.token().map(str::to_string),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn repo_url(&self, repo: &RepositoryId, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.base_url, repo.owner(), repo.name(), suffix)
    }

    /// Attaches the bearer token when one is configured.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Top contributors of the last 90 days, or the reason there are none.
    pub async fn try_fetch_contributors(
        &self,
        repo: &RepositoryId,
    ) -> std::result::Result<Vec<ContributionRecord>, FetchError> {
        let token = self.token.as_deref().ok_or(FetchError::MissingToken)?;

        let response = self
            .http
            .get(self.repo_url(repo, "/commits"))
            .query(&[("since", window_start(Utc::now()))])
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let commits: Vec<CommitEntry> = response.json().await?;
                let ranked = rank_contributors(&commits);
                tracing::debug!(
                    repo = %repo,
                    commits = commits.len(),
                    contributors = ranked.len(),
                    "Ranked contributors"
                );
                Ok(ranked)
            }
            StatusCode::FORBIDDEN => Err(FetchError::RateLimited),
            status => Err(FetchError::Upstream(status)),
        }
    }

    /// Top contributors of the last 90 days; any failure is logged and yields an empty list.
    pub async fn fetch_contributors(&self, repo: &RepositoryId) -> Vec<ContributionRecord> {
        match self.try_fetch_contributors(repo).await {
            Ok(contributors) => contributors,
            Err(FetchError::RateLimited) => {
                tracing::warn!(repo = %repo, "Error fetching contributors: {}", FetchError::RateLimited);
                Vec::new()
            }
            Err(e) => {
                tracing::error!(repo = %repo, "Error fetching contributors: {}", e);
                Vec::new()
            }
        }
    }

    /// Contributor rankings for every repository, fetched concurrently.
    pub async fn fetch_metrics(&self, repos: &[RepositoryId]) -> Vec<RepositoryMetrics> {
        let lookups = repos.iter().map(|repo| async move {
            RepositoryMetrics {
                repository: repo.clone(),
                contributors: self.fetch_contributors(repo).await,
            }
        });
        join_all(lookups).await
    }

    pub async fn fetch_issues(&self, repo: &RepositoryId) -> Result<IssueFetch> {
        let response = self
            .authorized(self.http.get(self.repo_url(repo, "/issues")))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::warn!(repo = %repo, status = %response.status(), "Issue listing failed");
            return Ok(IssueFetch::Failed(IssueError::for_repository(repo)));
        }

        let body: Value = response.json().await?;
        Ok(IssueFetch::Issues(body))
    }

    pub async fn check_repository(&self, repo: &RepositoryId) -> Result<()> {
        let response = self
            .authorized(self.http.get(self.repo_url(repo, "")))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(AppError::InvalidRepository(format!(
                "Repository {} does not exist on GitHub.",
                repo
            ))),
            status => Err(AppError::InvalidRepository(format!(
                "GitHub API error: {}. Please try again later.",
                status
            ))),
        }
    }
}
