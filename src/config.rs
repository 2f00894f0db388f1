//! Runtime settings resolved once at startup.
//!
//! Every value comes from a CLI flag with an environment fallback, then is
//! handed to the components that need it. Nothing reads the environment
//! after this point.

use std::time::Duration;

use clap::Args;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// GitHub API token used for commit queries
    #[arg(long, env = "GH_API_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL, global = true)]
    pub github_api_url: String,

    /// Database holding the tracked repositories
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://engagetrack.db", global = true)]
    pub database_url: String,

    /// Per-request timeout for GitHub calls, in seconds
    #[arg(long, default_value = "30", global = true)]
    pub timeout_secs: u64,
}

impl Settings {
    /// Settings pointing at an arbitrary API base, without a database file.
    #[cfg(test)]
    pub fn for_api(github_api_url: impl Into<String>, github_token: Option<&str>) -> Self {
        Self {
            github_token: github_token.map(str::to_string),
            github_api_url: github_api_url.into(),
            database_url: "sqlite::memory:".to_string(),
            timeout_secs: 30,
        }
    }

    /// The configured token, treating an empty string as absent.
    pub fn token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
