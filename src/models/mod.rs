//! Data transfer objects shared by the API, the pages and the CLI.
//!
//! - `repository`: RepositoryId, TrackedRepo
//! - `metrics`: ContributionRecord, RepositoryMetrics
//! - `issue`: IssueFetch, IssueError, HistogramBin

pub mod issue;
pub mod metrics;
pub mod repository;

pub use issue::*;
pub use metrics::*;
pub use repository::*;
