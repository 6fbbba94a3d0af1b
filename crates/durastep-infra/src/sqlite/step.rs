//! SQLite step store implementation.
//!
//! Implements `StepStore` from `durastep-core` using sqlx with split
//! read/write pools. Each committed step is one row in the `steps` table,
//! keyed by `(workflow_id, step_key)`; writes are upserts committed before
//! `put_step` returns, which is the durability contract the step primitive
//! relies on.

use durastep_core::store::StepStore;
use durastep_types::error::StoreError;
use durastep_types::step::{StepRecord, StepStatus};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `StepStore`.
pub struct SqliteStepStore {
    pool: DatabasePool,
}

impl SqliteStepStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a store at the given database URL.
    pub async fn open(database_url: &str) -> Result<Self, StoreError> {
        let pool = DatabasePool::new(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct StepRow {
    workflow_id: String,
    step_key: String,
    status: String,
    output: String,
}

impl StepRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            workflow_id: row.try_get("workflow_id")?,
            step_key: row.try_get("step_key")?,
            status: row.try_get("status")?,
            output: row.try_get("output")?,
        })
    }

    fn into_record(self) -> Result<StepRecord, StoreError> {
        let status: StepStatus =
            serde_json::from_value(serde_json::Value::String(self.status.clone()))
                .map_err(|_| StoreError::Corrupt(format!("unknown step status: {}", self.status)))?;

        Ok(StepRecord {
            workflow_id: self.workflow_id,
            step_key: self.step_key,
            status,
            output: self.output,
        })
    }
}

// ---------------------------------------------------------------------------
// StepStore impl
// ---------------------------------------------------------------------------

impl StepStore for SqliteStepStore {
    async fn get_step(
        &self,
        workflow_id: &str,
        step_key: &str,
    ) -> Result<Option<StepRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT workflow_id, step_key, status, output FROM steps WHERE workflow_id = ? AND step_key = ?",
        )
        .bind(workflow_id)
        .bind(step_key)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r = StepRow::from_row(&row).map_err(|e| StoreError::Query(e.to_string()))?;
                Ok(Some(r.into_record()?))
            }
            None => Ok(None),
        }
    }

    async fn put_step(&self, record: &StepRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO steps (workflow_id, step_key, status, output)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(workflow_id, step_key) DO UPDATE SET
                 status = excluded.status,
                 output = excluded.output"#,
        )
        .bind(&record.workflow_id)
        .bind(&record.step_key)
        .bind(record.status.as_str())
        .bind(&record.output)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_steps(&self, workflow_id: &str) -> Result<Vec<StepRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT workflow_id, step_key, status, output FROM steps WHERE workflow_id = ? ORDER BY rowid ASC",
        )
        .bind(workflow_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = StepRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            records.push(r.into_record()?);
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
