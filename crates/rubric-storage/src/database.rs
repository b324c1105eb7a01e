// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use rubric_core::RubricError;
use tokio_rusqlite::Connection;

/// Handle to the service's SQLite database.
///
/// Cheap to clone; all clones share the single writer connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, RubricError> {
        Self::open_with_options(path, true).await
    }

    /// Open with explicit WAL control. `wal_mode = false` is only useful for
    /// storage on filesystems that mishandle WAL side files.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, RubricError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RubricError::Storage {
                source: Box::new(e),
            })?;
        }

        // Migrations run on a short-lived blocking connection before the
        // single async writer opens.
        {
            let mut setup = rusqlite::Connection::open(path).map_err(map_sql_err)?;
            crate::migrations::run_migrations(&mut setup)?;
        }

        let conn = Connection::open(path).await.map_err(map_sql_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        tracing::debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The shared tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the background connection thread.
    pub async fn close(self) -> Result<(), RubricError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RubricError {
    RubricError::Storage {
        source: Box::new(e),
    }
}

fn map_sql_err(e: rusqlite::Error) -> RubricError {
    RubricError::Storage {
        source: Box::new(e),
    }
}

/// Current UTC time as an RFC 3339 string with millisecond precision.
///
/// Matches the `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` format used by the
/// schema defaults so string comparison orders correctly.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
