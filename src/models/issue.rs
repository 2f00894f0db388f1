//! Issue listing DTOs.
//!
//! A successful listing is passed through untouched as the raw JSON body,
//! whatever its shape. A failed listing becomes an error record instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RepositoryId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueFetch {
    // Listed first so an `{"error": ...}` body is not swallowed by `Value`.
    Failed(IssueError),
    Issues(Value),
}

impl IssueFetch {
    /// Issue objects in the listing; empty for an error record or a non-array body.
    pub fn issues(&self) -> &[Value] {
        match self {
            IssueFetch::Issues(Value::Array(list)) => list,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueError {
    pub error: String,
}

impl IssueError {
    pub fn for_repository(repo: &RepositoryId) -> Self {
        Self {
            error: format!("Failed to fetch issues for {}", repo),
        }
    }
}

/// One histogram bucket of issue response times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower_hours: f64,
    pub upper_hours: f64,
    pub count: usize,
}
