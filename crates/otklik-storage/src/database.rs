// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use otklik_core::OtklikError;

/// Handle to the SQLite database backing the feedback store.
///
/// Opening runs all pending migrations. The wrapped connection is the
/// single writer for the process; the sync pipeline and any admin reader
/// share it.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// migrations.
    ///
    /// `wal_mode` selects the journal mode: WAL when true, SQLite's default
    /// rollback journal when false.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, OtklikError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| OtklikError::Storage { source: Box::new(e) })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| OtklikError::Storage { source: Box::new(e) })?;

        let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.pragma_update(None, "journal_mode", journal_mode)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        // Migration errors are refinery's, not rusqlite's, so they ride
        // back as the closure's success value.
        let migration_result = conn
            .call(|conn| -> Result<Result<(), OtklikError>, rusqlite::Error> {
                Ok(crate::migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?;
        migration_result?;

        tracing::debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), OtklikError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite transport/query error into the domain error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> OtklikError {
    OtklikError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_runs_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists(), "database file should be created");

        // Migrated tables exist.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type = 'table' AND name IN
                     ('accounts', 'settings', 'feedbacks', 'products', 'rag_examples')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 5);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn journal_mode_follows_the_wal_flag() {
        async fn journal_mode(db: &Database) -> String {
            db.connection()
                .call(|conn| -> Result<String, rusqlite::Error> {
                    conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
                })
                .await
                .unwrap()
        }

        let dir = tempdir().unwrap();

        let db_path = dir.path().join("wal.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert_eq!(journal_mode(&db).await, "wal");
        db.close().await.unwrap();

        let db_path = dir.path().join("rollback.db");
        let db = Database::open(db_path.to_str().unwrap(), false).await.unwrap();
        assert_eq!(journal_mode(&db).await, "delete");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        {
            let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open must not re-apply migrations.
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
    }
}
