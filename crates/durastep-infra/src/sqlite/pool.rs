//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a
//! `DatabasePool` with a multi-connection reader pool for concurrent reads
//! and a single-connection writer pool for serialized writes. Both use WAL
//! journal mode. The schema is created on every open (`IF NOT EXISTS`), so
//! the pool tolerates a backing file created by a previous process as well
//! as a path that does not exist yet.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// The single table the engine needs: one row per committed step.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS steps (
        workflow_id TEXT NOT NULL,
        step_key    TEXT NOT NULL,
        status      TEXT NOT NULL,
        output      TEXT NOT NULL,
        PRIMARY KEY (workflow_id, step_key)
    )
"#;

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Create a new DatabasePool with split reader/writer connections.
    ///
    /// Initializes the schema on the writer pool before the reader pool
    /// opens. Both pools use WAL journal mode and a 5-second busy timeout;
    /// the backing file is created if missing.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        sqlx::query(SCHEMA).execute(&writer).await?;
        tracing::debug!(database_url, "step store schema ensured");

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Returns the default database URL based on the `DURASTEP_DATA_DIR` env
/// var, falling back to `~/.durastep/durastep.db`.
pub fn default_database_url() -> String {
    let data_dir = std::env::var("DURASTEP_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.durastep")
    });
    format!("sqlite://{data_dir}/durastep.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn pool_creates_steps_table() {
        let pool = test_pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert!(table_names.contains(&"steps"), "steps table missing");
    }

    #[tokio::test]
    async fn pool_wal_mode() {
        let pool = test_pool().await;

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn pool_reopens_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);

        let first = DatabasePool::new(&url).await.unwrap();
        sqlx::query("INSERT INTO steps (workflow_id, step_key, status, output) VALUES (?, ?, ?, ?)")
            .bind("wf-1")
            .bind("greet_seq_1")
            .bind("COMPLETED")
            .bind("\"hi\"")
            .execute(&first.writer)
            .await
            .unwrap();
        first.writer.close().await;
        first.reader.close().await;

        // Schema init must be idempotent and leave existing rows intact.
        let second = DatabasePool::new(&url).await.unwrap();
        let row: (String,) = sqlx::query_as(
            "SELECT output FROM steps WHERE workflow_id = ? AND step_key = ?",
        )
        .bind("wf-1")
        .bind("greet_seq_1")
        .fetch_one(&second.reader)
        .await
        .unwrap();
        assert_eq!(row.0, "\"hi\"");
    }

    #[tokio::test]
    async fn default_database_url_shape() {
        let url = default_database_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("durastep.db"));
    }
}
