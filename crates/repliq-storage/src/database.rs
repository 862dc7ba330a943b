// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes -- the
//! atomicity of the dedup ledger reserve depends on this single-writer
//! invariant.

use repliq_core::RepliqError;
use tracing::debug;

use crate::migrations;

/// Handle to the engine database. Cheap to clone via `connection()`.
#[derive(Debug)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RepliqError {
    RepliqError::Storage {
        source: Box::new(e),
    }
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, RepliqError> {
        // Connection::open fails with a plain rusqlite error, not the
        // tokio-rusqlite wrapper.
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| RepliqError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        // Refinery reports its own error type; carry it out through the Ok
        // channel so the closure error stays rusqlite::Error.
        let migration_result: Result<(), String> = conn
            .call(|conn| Ok(migrations::run_migrations(conn).map_err(|e| e.to_string())))
            .await
            .map_err(map_tr_err)?;
        migration_result.map_err(|e| RepliqError::Storage { source: e.into() })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), RepliqError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_and_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        assert!(db_path.exists());

        // Migrations should have created the engine tables.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type = 'table'
                       AND name IN ('automations', 'connections', 'processed_ids')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 3);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_failure_surfaces_as_storage_error() {
        let err = Database::open("/definitely/not/a/dir/engine.db")
            .await
            .unwrap_err();
        assert!(matches!(err, RepliqError::Storage { .. }));
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open must not re-apply migrations.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
