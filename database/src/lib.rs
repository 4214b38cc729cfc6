//! SQLite history of completed analysis runs.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use mindscan_core::{AggregateReport, CoreError, DatabaseError, SentimentLabel, SortMode};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;


pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// One stored run: what was asked for and how the posts were labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub community: String,
    pub sort: SortMode,
    pub post_limit: u32,
    pub counts: BTreeMap<SentimentLabel, usize>,
    pub total_posts: usize,
    pub analyzed_at: DateTime<Utc>,
}

pub struct Database {
    connection_string: String,
    pool: Option<SqlitePool>,
}

impl Database {
    pub fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            pool: None,
        }
    }

    pub async fn connect(&mut self) -> Result<(), CoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&self.connection_string)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("Connected to database at {}", self.connection_string);
        self.pool = Some(pool);
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations")
            .run(self.pool()?)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                migration: e.to_string(),
            })?;

        debug!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }

    fn pool(&self) -> Result<&SqlitePool, DatabaseError> {
        self.pool.as_ref().ok_or_else(|| DatabaseError::ConnectionFailed {
            reason: "database is not connected".to_string(),
        })
    }

    /// Store the outcome of a run. The report's timestamp becomes `analyzed_at`.
    pub async fn save_run(
        &self,
        community: &str,
        sort: SortMode,
        post_limit: u32,
        report: &AggregateReport,
    ) -> Result<HistoryEntry, CoreError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            community: community.to_string(),
            sort,
            post_limit,
            counts: report.counts.clone(),
            total_posts: report.total_analyzed,
            analyzed_at: report.generated_at.trunc_subsecs(6),
        };
        let counts = serde_json::to_string(&entry.counts)?;

        sqlx::query(
            "INSERT INTO analysis_history \
             (id, community, sort_mode, post_limit, counts, total_posts, analyzed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.community.as_str())
        .bind(entry.sort.as_str())
        .bind(i64::from(entry.post_limit))
        .bind(counts)
        .bind(entry.total_posts as i64)
        .bind(format_timestamp(&entry.analyzed_at))
        .execute(self.pool()?)
        .await
        .map_err(DatabaseError::from)?;

        info!("Saved analysis {} of r/{}", entry.id, entry.community);
        Ok(entry)
    }

    /// Up to `limit` stored runs, newest first.
    pub async fn recent_runs(&self, limit: u32) -> Result<Vec<HistoryEntry>, CoreError> {
        let rows = sqlx::query(
            "SELECT id, community, sort_mode, post_limit, counts, total_posts, analyzed_at \
             FROM analysis_history \
             ORDER BY analyzed_at DESC, rowid DESC \
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool()?)
        .await
        .map_err(DatabaseError::from)?;

        let entries = rows
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} history entries", entries.len());
        Ok(entries)
    }

    /// Returns whether a run with `id` existed.
    pub async fn delete_run(&self, id: Uuid) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM analysis_history WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool()?)
            .await
            .map_err(DatabaseError::from)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted analysis {}", id);
        }
        Ok(deleted)
    }
}

// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn invalid_record(details: impl Into<String>) -> DatabaseError {
    DatabaseError::InvalidRecord {
        details: details.into(),
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<HistoryEntry, DatabaseError> {
    let id: String = row.try_get("id")?;
    let sort: String = row.try_get("sort_mode")?;
    let post_limit: i64 = row.try_get("post_limit")?;
    let counts: String = row.try_get("counts")?;
    let total_posts: i64 = row.try_get("total_posts")?;
    let analyzed_at: String = row.try_get("analyzed_at")?;

    Ok(HistoryEntry {
        id: Uuid::parse_str(&id).map_err(|e| invalid_record(format!("id '{}': {}", id, e)))?,
        community: row.try_get("community")?,
        sort: sort
            .parse()
            .map_err(|_| invalid_record(format!("sort mode '{}'", sort)))?,
        post_limit: u32::try_from(post_limit)
            .map_err(|_| invalid_record(format!("post limit {}", post_limit)))?,
        counts: serde_json::from_str(&counts)
            .map_err(|e| invalid_record(format!("counts: {}", e)))?,
        total_posts: usize::try_from(total_posts)
            .map_err(|_| invalid_record(format!("total posts {}", total_posts)))?,
        analyzed_at: DateTime::parse_from_rfc3339(&analyzed_at)
            .map_err(|e| invalid_record(format!("timestamp '{}': {}", analyzed_at, e)))?
            .with_timezone(&Utc),
    })
}
