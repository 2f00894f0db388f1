//! Commit counting and ranking.
//!
//! Turns the commit objects of one `/commits` page into the top contributor
//! list. Ties keep first-seen order: counts accumulate in a vector indexed by
//! author, and the final sort is stable.

use std::collections::HashMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;

use crate::models::ContributionRecord;

pub const CONTRIBUTION_WINDOW_DAYS: i64 = 90;
pub const TOP_CONTRIBUTORS: usize = 10;

/// The subset of a GitHub commit object that the ranking reads.
#[derive(Debug, Deserialize)]
pub struct CommitEntry {
    #[serde(default)]
    commit: Option<CommitBody>,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    #[serde(default)]
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    #[serde(default)]
    name: Option<String>,
}

impl CommitEntry {
    pub fn author_name(&self) -> Option<&str> {
        self.commit
            .as_ref()?
            .author
            .as_ref()?
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

/// `since` value for the commit query: the start of the contribution window.
pub fn window_start(now: DateTime<Utc>) -> String {
    (now - Duration::days(CONTRIBUTION_WINDOW_DAYS)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn rank_contributors(commits: &[CommitEntry]) -> Vec<ContributionRecord> {
    rank_authors(commits.iter().filter_map(CommitEntry::author_name))
}

pub fn rank_authors<'a>(authors: impl IntoIterator<Item = &'a str>) -> Vec<ContributionRecord> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ContributionRecord> = Vec::new();

    for author in authors {
        match index.get(author).copied() {
            Some(slot) => counts[slot].contributions += 1,
            None => {
                index.insert(author, counts.len());
                counts.push(ContributionRecord {
                    name: author.to_string(),
                    contributions: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    counts.truncate(TOP_CONTRIBUTORS);
    counts
}
