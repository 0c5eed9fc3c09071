//! Event log - which commands ran and which backend calls failed
//!
//! Events go to `logs.duckdb` in the ewallet directory. The HTTP client records
//! every failed request with its service, HTTP status and error kind, so
//! `ew logs stats` can tell a dead bank service from an expired session. Rows
//! never hold tokens, passwords, phone numbers or amounts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::config::ServiceName;
use crate::domain::result::Error;
use crate::log_migrations::LOG_MIGRATIONS;

pub const LOGS_FILENAME: &str = "logs.duckdb";

/// Event name for a backend call that did not succeed
pub const REQUEST_FAILED: &str = "request_failed";

/// Which front end produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// An event to record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    /// A failed call to `service`
    pub fn request_failed(service: ServiceName, error: &Error) -> Self {
        Self::new(REQUEST_FAILED).with_service(service).with_failure(error)
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_service(mut self, service: ServiceName) -> Self {
        self.service = Some(service);
        self
    }

    /// Message, kind and HTTP status of a core error
    pub fn with_failure(mut self, error: &Error) -> Self {
        self.http_status = error.status();
        self.error_kind = Some(error.kind().to_string());
        self.error_message = Some(error.to_string());
        self
    }

    /// A failure reported as text only, such as a FAILED transfer status
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    /// Unix ms
    pub logged_at: i64,
    pub entry_point: String,
    pub app_version: String,
    pub event: String,
    pub command: Option<String>,
    pub service: Option<String>,
    pub http_status: Option<u16>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

impl LogEntry {
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Filter for [`LoggingService::query`]
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub limit: usize,
    pub errors_only: bool,
    pub service: Option<ServiceName>,
}

impl LogQuery {
    /// Newest `limit` events of any kind
    pub fn recent(limit: usize) -> Self {
        Self {
            limit,
            errors_only: false,
            service: None,
        }
    }

    pub fn errors_only(mut self) -> Self {
        self.errors_only = true;
        self
    }

    pub fn for_service(mut self, service: ServiceName) -> Self {
        self.service = Some(service);
        self
    }
}

/// Failure counts for one backend service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFailures {
    pub service: String,
    pub failures: u64,
    /// Replies with 401
    pub session_expired: u64,
    /// Replies with 5xx
    pub server_errors: u64,
    /// No reply at all (timeouts, refused connections)
    pub unreachable: u64,
    pub last_failure: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStats {
    pub total: u64,
    pub errors: u64,
    pub oldest: Option<i64>,
    pub newest: Option<i64>,
    /// Most failing service first
    pub services: Vec<ServiceFailures>,
}

/// DuckDB-backed event log
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `ewallet_dir` and bring its schema up to date
    pub fn new(
        ewallet_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(ewallet_dir)?;
        let db_path = ewallet_dir.join(LOGS_FILENAME);
        let conn = Connection::open(&db_path)?;
        migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.conn()?.execute(
            r#"
            INSERT INTO sys_logs (
                logged_at, entry_point, app_version, event, command,
                service, http_status, error_kind, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                Utc::now().timestamp_millis(),
                self.entry_point.as_str(),
                &self.app_version,
                &event.event,
                &event.command,
                event.service.map(|s| s.as_str()),
                event.http_status.map(i32::from),
                &event.error_kind,
                &event.error_message,
            ],
        )?;
        Ok(())
    }

    /// Newest events first
    pub fn query(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let mut clauses = Vec::new();
        let mut params: Vec<String> = Vec::new();
        if query.errors_only {
            clauses.push("error_message IS NOT NULL");
        }
        if let Some(service) = query.service {
            clauses.push("service = ?");
            params.push(service.as_str().to_string());
        }
        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT id, logged_at, entry_point, app_version, event, command,
                   service, http_status, error_kind, error_message
            FROM sys_logs
            {}
            ORDER BY logged_at DESC, id DESC
            LIMIT {}
            "#,
            filter, query.limit
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(duckdb::params_from_iter(params.iter()), map_entry)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Totals plus per-service failure counts for `ew logs stats`
    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.conn()?;
        let (total, errors, oldest, newest): (u64, u64, Option<i64>, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), COUNT(error_message), MIN(logged_at), MAX(logged_at) FROM sys_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT service,
                   COUNT(*),
                   COUNT(*) FILTER (WHERE http_status = 401),
                   COUNT(*) FILTER (WHERE http_status >= 500),
                   COUNT(*) FILTER (WHERE error_kind = 'network'),
                   MAX(logged_at)
            FROM sys_logs
            WHERE event = ? AND service IS NOT NULL
            GROUP BY service
            ORDER BY 2 DESC, service
            "#,
        )?;
        let services = stmt
            .query_map([REQUEST_FAILED], |row| {
                Ok(ServiceFailures {
                    service: row.get(0)?,
                    failures: row.get(1)?,
                    session_expired: row.get(2)?,
                    server_errors: row.get(3)?,
                    unreachable: row.get(4)?,
                    last_failure: row.get(5)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(LogStats {
            total,
            errors,
            oldest,
            newest,
            services,
        })
    }

    /// Drop events older than `days`; a window reaching past the epoch keeps everything
    pub fn delete_older_than(&self, days: u64) -> Result<u64> {
        let cutoff = i64::try_from(days)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .map(|t| t.timestamp_millis());
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let deleted = self
            .conn()?
            .execute("DELETE FROM sys_logs WHERE logged_at < ?", [cutoff])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Run the bootstrap script, then every migration not yet recorded
fn migrate(conn: &Connection) -> Result<()> {
    let ((_, bootstrap), pending) = LOG_MIGRATIONS
        .split_first()
        .ok_or_else(|| anyhow!("no log migrations embedded"))?;
    conn.execute_batch(bootstrap)?;

    let applied: HashSet<String> = {
        let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let names: HashSet<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<duckdb::Result<_>>()?;
        names
    };

    for (name, sql) in pending {
        if applied.contains(*name) {
            continue;
        }
        conn.execute_batch(sql)?;
        conn.execute(
            "INSERT INTO sys_migrations (migration_name) VALUES (?)",
            [*name],
        )?;
    }
    Ok(())
}

fn map_entry(row: &duckdb::Row<'_>) -> duckdb::Result<LogEntry> {
    let http_status: Option<i32> = row.get(7)?;
    Ok(LogEntry {
        id: row.get(0)?,
        logged_at: row.get(1)?,
        entry_point: row.get(2)?,
        app_version: row.get(3)?,
        event: row.get(4)?,
        command: row.get(5)?,
        service: row.get(6)?,
        http_status: http_status.and_then(|s| u16::try_from(s).ok()),
        error_kind: row.get(8)?,
        error_message: row.get(9)?,
    })
}
