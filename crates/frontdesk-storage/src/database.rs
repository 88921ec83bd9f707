// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! one-customer-per-phone and one-open-conversation guarantees rely on it.

use std::path::Path;
use std::time::Duration;

use frontdesk_core::FrontdeskError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply PRAGMAs and
    /// run pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, FrontdeskError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(FrontdeskError::storage)?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, FrontdeskError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(map_tr_err)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), FrontdeskError> {
        self.conn
            .call(move |conn| -> Result<(), FrontdeskError> {
                if wal_mode {
                    let mode: String = conn
                        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                        .map_err(FrontdeskError::storage)?;
                    debug!(journal_mode = %mode, "journal mode set");
                }
                conn.pragma_update(None, "synchronous", "NORMAL")
                    .map_err(FrontdeskError::storage)?;
                conn.pragma_update(None, "foreign_keys", "ON")
                    .map_err(FrontdeskError::storage)?;
                conn.busy_timeout(Duration::from_secs(5))
                    .map_err(FrontdeskError::storage)?;
                run_migrations(conn)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into a storage error.
pub(crate) fn map_tr_err(err: impl std::fmt::Display) -> FrontdeskError {
    FrontdeskError::Storage {
        source: err.to_string().into(),
    }
}
