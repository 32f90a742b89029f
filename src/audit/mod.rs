//! Audit log, SQLite-based history of session operations.
//!
//! Records what happened (unlock, add, delete, save, ...) and to which
//! entry id, in `<dir>/.passlock-audit.db`.  Never records passwords,
//! names, or any other entry field.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use crate::errors::{PasslockError, Result};

/// File name of the audit database inside the session directory.
pub const DB_FILE: &str = ".passlock-audit.db";

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub entry_id: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database in `dir`.
    ///
    /// Returns `None` if the database can't be opened, callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(dir);
        let conn = match Connection::open(&db_path) {
            Ok(conn) => conn,
            Err(e) => {
                debug!(error = %e, "audit log unavailable");
                return None;
            }
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                operation TEXT NOT NULL,
                entry_id  TEXT,
                details   TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget.
    pub fn log(&self, operation: &str, entry_id: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, entry_id, details)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![now, operation, entry_id, details],
        ) {
            debug!(error = %e, operation, "audit write failed");
        }
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, entry_id, details
                 FROM audit_log
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(|e| PasslockError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map([limit], |row| {
                let ts: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    entry_id: row.get(3)?,
                    details: row.get(4)?,
                })
            })
            .map_err(|e| PasslockError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| PasslockError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    pub fn db_path(dir: &Path) -> PathBuf {
        dir.join(DB_FILE)
    }
}

/// Open the log in `dir`, record one event, ignore every error.
pub fn log_audit(dir: &Path, operation: &str, entry_id: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(dir) {
        audit.log(operation, entry_id, details);
    }
}
