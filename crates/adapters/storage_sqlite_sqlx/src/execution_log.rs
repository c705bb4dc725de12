//! `SQLite` implementation of [`ExecutionLog`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use pageforge_app::execution::{ActionOutcome, ExecutionRecord, ExecutionStatus};
use pageforge_app::ports::ExecutionLog;
use pageforge_domain::error::PageForgeError;
use pageforge_domain::id::{AutomationId, ExecutionId};

use crate::error::StorageError;

fn status_as_str(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Succeeded => "succeeded",
        ExecutionStatus::Partial => "partial",
        ExecutionStatus::Failed => "failed",
    }
}

fn status_from_str(value: &str) -> Result<ExecutionStatus, sqlx::Error> {
    match value {
        "succeeded" => Ok(ExecutionStatus::Succeeded),
        "partial" => Ok(ExecutionStatus::Partial),
        "failed" => Ok(ExecutionStatus::Failed),
        other => Err(sqlx::Error::Decode(
            format!("unknown execution status: {other}").into(),
        )),
    }
}

struct Wrapper(ExecutionRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let automation_id: String = row.try_get("automation_id")?;
        let automation_name: String = row.try_get("automation_name")?;
        let source: String = row.try_get("source")?;
        let status: String = row.try_get("status")?;
        let outcomes_json: String = row.try_get("outcomes")?;
        let started_at: String = row.try_get("started_at")?;
        let finished_at: String = row.try_get("finished_at")?;

        let id = ExecutionId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let automation_id = AutomationId::from_str(&automation_id)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let status = status_from_str(&status)?;
        let outcomes: Vec<ActionOutcome> = serde_json::from_str(&outcomes_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let started_at = chrono::DateTime::parse_from_rfc3339(&started_at)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let finished_at = chrono::DateTime::parse_from_rfc3339(&finished_at)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(ExecutionRecord {
            id,
            automation_id,
            automation_name,
            source,
            status,
            outcomes,
            started_at,
            finished_at,
        }))
    }
}

/// `SQLite`-backed execution log.
pub struct SqliteExecutionLog {
    pool: SqlitePool,
}

impl SqliteExecutionLog {
    /// Create a new execution log backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ExecutionLog for SqliteExecutionLog {
    async fn append(&self, record: ExecutionRecord) -> Result<(), PageForgeError> {
        let outcomes_json = serde_json::to_string(&record.outcomes).map_err(StorageError::from)?;

        sqlx::query(
                "INSERT INTO automation_executions (id, automation_id, automation_name, source, status, outcomes, started_at, finished_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(record.id.to_string())
            .bind(record.automation_id.to_string())
            .bind(&record.automation_name)
            .bind(&record.source)
            .bind(status_as_str(record.status))
            .bind(&outcomes_json)
            .bind(record.started_at.to_rfc3339())
            .bind(record.finished_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ExecutionRecord>, PageForgeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_executions ORDER BY started_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn recent_for(
        &self,
        automation_id: AutomationId,
        limit: u32,
    ) -> Result<Vec<ExecutionRecord>, PageForgeError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM automation_executions WHERE automation_id = ? ORDER BY started_at DESC LIMIT ?",
        )
        .bind(automation_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
