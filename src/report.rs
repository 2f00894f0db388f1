//! Chart data and the standalone HTML report.
//!
//! - `contributor_bars`: contributor counts scaled against the top contributor
//! - `MetricsChart`: per-repository bars for the results page
//! - `response_times_hours`: `closed_at - created_at` per issue, in hours
//! - `histogram`: equal-width buckets over those response times
//! - `render_report`: self-contained page written by `engagetrack metrics`

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tera::Context;

use crate::error::Result;
use crate::models::{ContributionRecord, HistogramBin, IssueFetch, RepositoryMetrics};
use crate::views::Views;

pub const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorBar {
    pub name: String,
    pub contributions: u32,
    pub percent: f64,
}

/// One repository's ranking shaped for the bar chart partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsChart {
    pub repository: String,
    pub contributors: Vec<ContributorBar>,
}

impl From<&RepositoryMetrics> for MetricsChart {
    fn from(metrics: &RepositoryMetrics) -> Self {
        Self {
            repository: metrics.repository.to_string(),
            contributors: contributor_bars(&metrics.contributors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct HistogramColumn {
    #[serde(flatten)]
    bin: HistogramBin,
    percent: f64,
}

pub fn contributor_bars(records: &[ContributionRecord]) -> Vec<ContributorBar> {
    let top = records.iter().map(|r| r.contributions).max().unwrap_or(0);
    records
        .iter()
        .map(|r| ContributorBar {
            name: r.name.clone(),
            contributions: r.contributions,
            percent: if top == 0 {
                0.0
            } else {
                f64::from(r.contributions) * 100.0 / f64::from(top)
            },
        })
        .collect()
}

fn timestamp(issue: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = issue.get(field)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Hours from opening to closing for every issue carrying both timestamps.
pub fn response_times_hours(issues: &[Value]) -> Vec<f64> {
    issues
        .iter()
        .filter_map(|issue| {
            let created = timestamp(issue, "created_at")?;
            let closed = timestamp(issue, "closed_at")?;
            Some((closed - created).num_seconds() as f64 / 3600.0)
        })
        .collect()
}

pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![HistogramBin {
            lower_hours: min,
            upper_hours: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in values {
        // The maximum lands exactly on the upper edge; keep it in the last bin.
        let slot = (((value - min) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower_hours: min + width * i as f64,
            upper_hours: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

pub fn render_report(views: &Views, metrics: &RepositoryMetrics, issues: &IssueFetch) -> Result<String> {
    let mut context = Context::new();
    context.insert("repo_url", &metrics.repository.to_string());
    context.insert("generated_at", &Utc::now().format("%Y-%m-%d %H:%M UTC").to_string());
    context.insert("contributors", &contributor_bars(&metrics.contributors));
    context.insert("stylesheet", &Views::stylesheet()?);

    match issues {
        IssueFetch::Issues(_) => {
            let list = issues.issues();
            let times = response_times_hours(list);
            let bins = histogram(&times, HISTOGRAM_BINS);
            let tallest = bins.iter().map(|b| b.count).max().unwrap_or(0);
            let columns: Vec<HistogramColumn> = bins
                .into_iter()
                .map(|bin| HistogramColumn {
                    percent: if tallest == 0 {
                        0.0
                    } else {
                        bin.count as f64 * 100.0 / tallest as f64
                    },
                    bin,
                })
                .collect();
            context.insert("issue_count", &list.len());
            context.insert("measured", &times.len());
            context.insert("histogram", &columns);
        }
        IssueFetch::Failed(record) => {
            context.insert("issue_error", &record.error);
        }
    }

    views.render("report.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueError, RepositoryId};
    use serde_json::json;

    #[test]
    fn response_times_skip_incomplete_issues() {
        let issues = vec![
            json!({ "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-01T06:00:00Z" }),
            json!({ "created_at": "2024-01-01T00:00:00Z", "closed_at": null }),
            json!({ "created_at": "2024-01-01T00:00:00Z" }),
            json!({ "closed_at": "2024-01-02T00:00:00Z" }),
            json!({ "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-03T00:00:00Z" }),
        ];
        assert_eq!(response_times_hours(&issues), vec![6.0, 48.0]);
    }

    #[test]
    fn histogram_puts_maximum_in_last_bin() {
        let bins = histogram(&[0.0, 1.0, 5.0, 10.0], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[5].count, 1);
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        assert_eq!(bins[9].upper_hours, 10.0);
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(histogram(&[], 10).is_empty());
        let single = histogram(&[3.0, 3.0, 3.0], 10);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 3);
    }

    #[test]
    fn bars_scale_against_top_contributor() {
        let bars = contributor_bars(&[
            ContributionRecord { name: "A".into(), contributions: 4 },
            ContributionRecord { name: "B".into(), contributions: 1 },
        ]);
        assert_eq!(bars[0].percent, 100.0);
        assert_eq!(bars[1].percent, 25.0);
    }

    #[test]
    fn report_renders_contributors_and_issue_error() {
        let views = Views::new().unwrap();
        let metrics = RepositoryMetrics {
            repository: RepositoryId::new("octocat", "Hello-World"),
            contributors: vec![ContributionRecord { name: "Mona".into(), contributions: 7 }],
        };

        let html = render_report(
            &views,
            &metrics,
            &IssueFetch::Failed(IssueError::for_repository(&metrics.repository)),
        )
        .unwrap();
        assert!(html.contains("Mona"));
        // Tera escapes the slash in the identifier.
        assert!(html.contains("Failed to fetch issues for octocat&#x2F;Hello-World"));

        let issues = json!([{
            "created_at": "2024-01-01T00:00:00Z",
            "closed_at": "2024-01-01T12:00:00Z"
        }]);
        let html = render_report(&views, &metrics, &IssueFetch::Issues(issues)).unwrap();
        assert!(html.contains("Issue Response Times"));
    }
}
