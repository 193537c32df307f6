//! Persistence boundary for session counters and event rows.
//!
//! The engine never waits on these writes. The driver hands every
//! [`PersistOp`] to a [`SessionStore`], logs failures and moves on; the
//! in-memory timeline stays authoritative for the running session.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::events::{PersistOp, SessionEventKind, SessionEventRecord};
use crate::timeline::{Counter, SessionClock};

/// Sink for per-second counter increments and discrete event rows.
pub trait SessionStore {
    fn increment_counter(&mut self, session_id: &str, counter: Counter) -> Result<(), StorageError>;

    fn record_event(&mut self, record: &SessionEventRecord) -> Result<(), StorageError>;

    fn apply(&mut self, session_id: &str, op: &PersistOp) -> Result<(), StorageError> {
        match op {
            PersistOp::IncrementCounter { counter } => self.increment_counter(session_id, *counter),
            PersistOp::RecordEvent(record) => self.record_event(record),
        }
    }
}

/// In-process store. Can be switched into a failing mode to exercise the
/// non-fatal persistence path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: HashMap<String, SessionClock>,
    events: Vec<SessionEventRecord>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn counters(&self, session_id: &str) -> SessionClock {
        self.counters.get(session_id).copied().unwrap_or_default()
    }

    pub fn events(&self) -> &[SessionEventRecord] {
        &self.events
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing {
            Err(StorageError::Unavailable("memory store set to fail".into()))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for MemoryStore {
    fn increment_counter(&mut self, session_id: &str, counter: Counter) -> Result<(), StorageError> {
        self.check()?;
        self.counters
            .entry(session_id.to_string())
            .or_default()
            .increment(counter);
        Ok(())
    }

    fn record_event(&mut self, record: &SessionEventRecord) -> Result<(), StorageError> {
        self.check()?;
        self.events.push(record.clone());
        Ok(())
    }
}

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session_counters (
                session_id      TEXT PRIMARY KEY,
                active_seconds  INTEGER NOT NULL DEFAULT 0,
                idle_seconds    INTEGER NOT NULL DEFAULT 0,
                away_seconds    INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS session_events (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id           TEXT NOT NULL,
                kind                 TEXT NOT NULL,
                timestamp            TEXT NOT NULL,
                gap_duration_seconds INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_session_events_session
                ON session_events(session_id);",
        )?;
        Ok(())
    }

    pub fn counters(&self, session_id: &str) -> Result<SessionClock, StorageError> {
        let totals = self
            .conn
            .query_row(
                "SELECT active_seconds, idle_seconds, away_seconds
                 FROM session_counters WHERE session_id = ?1",
                params![session_id],
                |row| {
                    Ok(SessionClock {
                        active_seconds: row.get::<_, i64>(0)? as u64,
                        idle_seconds: row.get::<_, i64>(1)? as u64,
                        away_seconds: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(totals.unwrap_or_default())
    }

    pub fn events(&self, session_id: &str) -> Result<Vec<SessionEventRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, kind, timestamp, gap_duration_seconds
             FROM session_events WHERE session_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            let kind: String = row.get(1)?;
            let timestamp: String = row.get(2)?;
            let gap: Option<i64> = row.get(3)?;
            let kind = SessionEventKind::parse(&kind).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    format!("unknown event kind '{kind}'").into(),
                )
            })?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Utc);
            Ok(SessionEventRecord {
                session_id: row.get(0)?,
                kind,
                timestamp,
                gap_duration_seconds: gap.map(|g| g as u64),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl SessionStore for SqliteStore {
    fn increment_counter(&mut self, session_id: &str, counter: Counter) -> Result<(), StorageError> {
        let column = match counter {
            Counter::Active => "active_seconds",
            Counter::Idle => "idle_seconds",
            Counter::Away => "away_seconds",
        };
        let sql = format!(
            "INSERT INTO session_counters (session_id, {column}) VALUES (?1, 1)
             ON CONFLICT(session_id) DO UPDATE SET {column} = {column} + 1"
        );
        self.conn.execute(&sql, params![session_id])?;
        Ok(())
    }

    fn record_event(&mut self, record: &SessionEventRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO session_events (session_id, kind, timestamp, gap_duration_seconds)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.session_id,
                record.kind.as_str(),
                record.timestamp.to_rfc3339(),
                record.gap_duration_seconds.map(|g| g as i64),
            ],
        )?;
        Ok(())
    }
}
