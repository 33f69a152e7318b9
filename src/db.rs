//! Database module
//!
//! Provides persistence for chat sessions and their message log. The
//! log is append-only; dispatch instructions are transient routing data
//! and are never written here.

mod schema;

pub use schema::*;

use crate::message::{Message, RenderHint, RenderKind, Role};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Create a new session
    pub fn create_session(&self, id: &str, slug: &str) -> DbResult<Session> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sessions (id, slug, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![id, slug, now.to_rfc3339()],
        )?;

        Ok(Session {
            id: id.to_string(),
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
            message_count: 0,
        })
    }

    /// Get session by ID
    pub fn get_session(&self, id: &str) -> DbResult<Session> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.slug, s.created_at, s.updated_at,
                    (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id) as message_count
             FROM sessions s WHERE s.id = ?1",
        )?;

        stmt.query_row(params![id], parse_session_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::SessionNotFound(id.to_string()),
                other => DbError::Sqlite(other),
            })
    }

    /// List sessions, most recently active first
    pub fn list_sessions(&self) -> DbResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.slug, s.created_at, s.updated_at,
                    (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id) as message_count
             FROM sessions s ORDER BY s.updated_at DESC",
        )?;

        let rows = stmt.query_map([], parse_session_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Delete a session and all its messages
    pub fn delete_session(&self, id: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();

        // Messages are deleted by CASCADE
        let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;

        if deleted == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== Message Operations ====================

    /// Append a message at the tail of a session's log
    pub fn append_message(
        &self,
        message_id: &str,
        session_id: &str,
        message: &Message,
    ) -> DbResult<StoredMessage> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let session_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
            params![session_id],
            |row| row.get(0),
        )?;
        if !session_exists {
            return Err(DbError::SessionNotFound(session_id.to_string()));
        }

        let sequence_id: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sequence_id), 0) + 1 FROM messages WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;

        let (render_kind, render_payload) = match &message.render_hint {
            Some(hint) => (Some(hint.kind.as_str()), Some(hint.payload.as_str())),
            None => (None, None),
        };

        conn.execute(
            "INSERT INTO messages (message_id, session_id, sequence_id, role, content, render_kind, render_payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                message_id,
                session_id,
                sequence_id,
                message.role.as_str(),
                message.text,
                render_kind,
                render_payload,
                now.to_rfc3339(),
            ],
        )?;

        conn.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            params![now.to_rfc3339(), session_id],
        )?;

        Ok(StoredMessage {
            message_id: message_id.to_string(),
            session_id: session_id.to_string(),
            sequence_id,
            message: message.clone(),
            created_at: now,
        })
    }

    /// Full ordered message log for a session
    pub fn history(&self, session_id: &str) -> DbResult<Vec<StoredMessage>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT message_id, session_id, sequence_id, role, content, render_kind, render_payload, created_at
             FROM messages WHERE session_id = ?1 ORDER BY sequence_id ASC",
        )?;

        let rows = stmt.query_map(params![session_id], parse_message_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn parse_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        slug: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
        message_count: row.get(4)?,
    })
}

fn parse_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMessage> {
    let raw_role: String = row.get(3)?;
    let role = Role::parse(&raw_role).unwrap_or_else(|| {
        tracing::warn!(role = %raw_role, "unrecognized role in stored message, reading as assistant");
        Role::Assistant
    });
    let text: String = row.get(4)?;
    let render_hint = match (
        row.get::<_, Option<String>>(5)?,
        row.get::<_, Option<String>>(6)?,
    ) {
        (Some(kind), Some(payload)) => RenderKind::parse(&kind).map(|kind| RenderHint {
            kind,
            payload,
        }),
        _ => None,
    };

    let message = match role {
        Role::User => Message::user(text),
        Role::Assistant => match render_hint {
            Some(hint) => Message::assistant_with_hint(text, hint),
            None => Message::assistant(text),
        },
    };

    Ok(StoredMessage {
        message_id: row.get(0)?,
        session_id: row.get(1)?,
        sequence_id: row.get(2)?,
        message,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(
        |_| {
            tracing::warn!(value = %s, "unparsable timestamp in stored row, substituting now");
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}
