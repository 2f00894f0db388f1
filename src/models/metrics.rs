use serde::{Deserialize, Serialize};

use super::RepositoryId;

/// Commits attributed to one author inside the contribution window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub name: String,
    pub contributions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub repository: RepositoryId,
    pub contributors: Vec<ContributionRecord>,
}
