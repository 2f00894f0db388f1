//! SQLite store of tracked repositories.
//!
//! One table, `tracked_repo`, created on connect. Metrics are never stored;
//! the only derived value kept is `last_retrieved`.

use std::str::FromStr;

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{RepositoryId, TrackedRepo};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tracked_repo (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        full_name TEXT NOT NULL UNIQUE,
        last_retrieved TEXT
    )
";

#[derive(Debug, Clone)]
pub struct RepoStore {
    pool: SqlitePool,
}

impl RepoStore {
    /// Opens the database, creating the file and table when missing.
    #[instrument(level = "debug")]
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        tracing::info!("Connected to database");

        Ok(Self { pool })
    }

    /// Returns the stored row for `repo`, inserting it first if it is new.
    ///
    /// Concurrent calls for the same repository converge on one row.
    pub async fn insert_or_get(&self, repo: &RepositoryId) -> Result<TrackedRepo> {
        let inserted = sqlx::query(
            "INSERT INTO tracked_repo (name, full_name, last_retrieved)
             VALUES (?, ?, ?)
             ON CONFLICT(full_name) DO NOTHING",
        )
        .bind(repo.name())
        .bind(repo.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = self
            .find_by_full_name(repo)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Row for {} vanished after insert", repo)))?;

        if inserted.rows_affected() > 0 {
            tracing::info!(repo = %repo, id = row.id, "Tracking repository");
        }
        Ok(row)
    }

    pub async fn find_by_full_name(&self, repo: &RepositoryId) -> Result<Option<TrackedRepo>> {
        let row = sqlx::query_as::<_, TrackedRepo>(
            "SELECT id, name, full_name, last_retrieved FROM tracked_repo WHERE full_name = ?",
        )
        .bind(repo.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<TrackedRepo>> {
        let rows = sqlx::query_as::<_, TrackedRepo>(
            "SELECT id, name, full_name, last_retrieved FROM tracked_repo ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<Option<TrackedRepo>> {
        let row = sqlx::query_as::<_, TrackedRepo>(
            "SELECT id, name, full_name, last_retrieved FROM tracked_repo WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Removes a repository; `false` when no row had that id.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tracked_repo WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_retrieved(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE tracked_repo SET last_retrieved = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> RepoStore {
        RepoStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_full_name() {
        let store = memory_store().await;
        let repo = RepositoryId::new("octocat", "Hello-World");

        let first = store.insert_or_get(&repo).await.unwrap();
        let second = store.insert_or_get(&repo).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Hello-World");
        assert_eq!(first.full_name, "octocat/Hello-World");
        assert!(first.last_retrieved.is_some());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_do_not_conflict() {
        let store = memory_store().await;
        let repo = RepositoryId::new("octocat", "Hello-World");

        let attempts = (0..4).map(|_| store.insert_or_get(&repo));
        let rows = futures::future::join_all(attempts).await;

        let ids: Vec<i64> = rows.into_iter().map(|r| r.unwrap().id).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]), "{ids:?}");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lists_in_insertion_order() {
        let store = memory_store().await;
        for name in ["a", "b", "c"] {
            store.insert_or_get(&RepositoryId::new("o", name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.full_name)
            .collect();
        assert_eq!(names, ["o/a", "o/b", "o/c"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = memory_store().await;
        let row = store
            .insert_or_get(&RepositoryId::new("octocat", "Hello-World"))
            .await
            .unwrap();

        assert!(store.delete(row.id).await.unwrap());
        assert!(!store.delete(row.id).await.unwrap());
        assert!(store.get(row.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_retrieved_moves_timestamp_forward() {
        let store = memory_store().await;
        let row = store
            .insert_or_get(&RepositoryId::new("octocat", "Hello-World"))
            .await
            .unwrap();

        store.mark_retrieved(row.id).await.unwrap();
        let refreshed = store.get(row.id).await.unwrap().unwrap();
        assert!(refreshed.last_retrieved >= row.last_retrieved);
        assert_eq!(
            refreshed.repository().unwrap(),
            RepositoryId::new("octocat", "Hello-World")
        );
    }
}
