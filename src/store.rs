//! Room and history collaborators
//!
//! The relay only sees the [`RoomStore`] and [`HistoryStore`] traits.
//! [`SqliteStore`] is the default adapter behind both.

mod schema;
mod traits;

pub use schema::*;
pub use traits::{HistoryStore, RoomStore};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Room not found: {0}")]
    RoomNotFound(String),
    #[error("Suggestion encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe `SQLite` handle
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    // ==================== Room Operations ====================

    pub fn create_room(&self, id: &str) -> StoreResult<ConversationSession> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO rooms (id, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![id, now],
        )?;
        Ok(ConversationSession::new(id))
    }

    pub fn get_room(&self, id: &str) -> StoreResult<ConversationSession> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, current_message_count, max_message_count, topic_generation, refresh_reason
             FROM rooms WHERE id = ?1",
            params![id],
            |row| {
                Ok(ConversationSession {
                    id: row.get(0)?,
                    current_message_count: row.get(1)?,
                    max_message_count: row.get(2)?,
                    topic_generation: row.get(3)?,
                    refresh_reason: row.get(4)?,
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::RoomNotFound(id.to_string()),
            other => StoreError::Sqlite(other),
        })
    }

    /// Fetch the room, creating it when it does not exist yet
    pub fn get_or_create_room(&self, id: &str) -> StoreResult<ConversationSession> {
        match self.get_room(id) {
            Err(StoreError::RoomNotFound(_)) => self.create_room(id),
            other => other,
        }
    }

    pub fn update_counters(&self, session: &ConversationSession) -> StoreResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE rooms SET current_message_count = ?1, max_message_count = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                session.current_message_count,
                session.max_message_count,
                Utc::now().to_rfc3339(),
                session.id
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::RoomNotFound(session.id.clone()));
        }
        Ok(())
    }

    /// Start a new topic: counters reset, generation bumped, reason kept
    pub fn refresh_room(&self, id: &str, reason: &str) -> StoreResult<ConversationSession> {
        {
            let conn = self.conn()?;
            let updated = conn.execute(
                "UPDATE rooms SET current_message_count = 0, max_message_count = 0,
                     topic_generation = topic_generation + 1, refresh_reason = ?1, updated_at = ?2
                 WHERE id = ?3",
                params![reason, Utc::now().to_rfc3339(), id],
            )?;
            if updated == 0 {
                return Err(StoreError::RoomNotFound(id.to_string()));
            }
        }
        self.get_room(id)
    }

    // ==================== Message Operations ====================

    pub fn append_message(&self, record: &HistoryRecord) -> StoreResult<StoredMessage> {
        let conn = self.conn()?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let suggestions = serde_json::to_string(&record.suggestions)?;

        conn.execute(
            "INSERT INTO room_messages (id, room_id, parent_message_id, role, content, suggestions, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                record.room_id,
                record.parent_message_id,
                record.role.to_string(),
                record.content,
                suggestions,
                now.to_rfc3339()
            ],
        )?;

        Ok(StoredMessage {
            id,
            created_at: now,
            record: record.clone(),
        })
    }

    pub fn get_messages(&self, room_id: &str) -> StoreResult<Vec<StoredMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, room_id, parent_message_id, role, content, suggestions, created_at
             FROM room_messages WHERE room_id = ?1 ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map(params![room_id], parse_message_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }
}

fn parse_message_row(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    let role: String = row.get(3)?;
    let suggestions: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    let role = role.parse::<MessageRole>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    let suggestions: Vec<String> = serde_json::from_str(&suggestions).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredMessage {
        id: row.get(0)?,
        created_at: parse_datetime(&created_at),
        record: HistoryRecord {
            room_id: row.get(1)?,
            parent_message_id: row.get(2)?,
            role,
            content: row.get(4)?,
            suggestions,
        },
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
