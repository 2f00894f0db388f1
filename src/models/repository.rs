//! Repository identity and the stored tracking row.
//!
//! - `RepositoryId`: owner/name pair used as the key into GitHub and the store
//! - `TrackedRepo`: one row of the `tracked_repo` table

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem-friendly form used for report file names.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AppError::InvalidRepository(format!(
                "Invalid repository '{}'. Expected the form owner/name.",
                raw.trim()
            ))
        };

        let trimmed = raw.trim();
        let trimmed = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix("github.com/").unwrap_or(trimmed);
        let trimmed = trimmed.trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;
        if !is_path_segment(owner) || !is_path_segment(name) {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}

/// Owner and name go into API paths unescaped, so only GitHub's own
/// characters are allowed and `.`/`..` are rejected.
fn is_path_segment(part: &str) -> bool {
    !part.is_empty()
        && part != "."
        && part != ".."
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl TryFrom<String> for RepositoryId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryId> for String {
    fn from(value: RepositoryId) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrackedRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub last_retrieved: Option<DateTime<Utc>>,
}

impl TrackedRepo {
    pub fn repository(&self) -> Result<RepositoryId, AppError> {
        self.full_name.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_owner_name() {
        let id: RepositoryId = "octocat/Hello-World".parse().unwrap();
        assert_eq!(id.owner(), "octocat");
        assert_eq!(id.name(), "Hello-World");
        assert_eq!(id.to_string(), "octocat/Hello-World");
    }

    #[test]
    fn tolerates_github_urls() {
        for raw in [
            "  octocat/Hello-World ",
            "https://github.com/octocat/Hello-World",
            "github.com/octocat/Hello-World/",
            "https://github.com/octocat/Hello-World.git",
        ] {
            let id: RepositoryId = raw.parse().unwrap();
            assert_eq!(id, RepositoryId::new("octocat", "Hello-World"), "{raw}");
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for raw in [
            "",
            "octocat",
            "/Hello-World",
            "octocat/",
            "a/b/c",
            "octo/hello#x",
            "octocat/Hello-World?x=1",
            "../users",
            "octo/..",
            "./hello",
            "octo cat/hello",
            "octo/hello%2Fcommits",
        ] {
            let err = raw.parse::<RepositoryId>().unwrap_err();
            assert!(matches!(err, AppError::InvalidRepository(_)), "{raw}");
        }
    }

    #[test]
    fn accepts_dots_inside_names() {
        let id: RepositoryId = "rust-lang/rust.vim".parse().unwrap();
        assert_eq!(id, RepositoryId::new("rust-lang", "rust.vim"));
        let id: RepositoryId = "octo_org/.github".parse().unwrap();
        assert_eq!(id.name(), ".github");
    }

    #[test]
    fn serializes_as_slash_string() {
        let id = RepositoryId::new("rust-lang", "rust");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"rust-lang/rust\"");
        let back: RepositoryId = serde_json::from_str("\"rust-lang/rust\"").unwrap();
        assert_eq!(back, id);
    }
}
