//! Store schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::throttle::ThrottleSnapshot;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS rooms (
    id TEXT PRIMARY KEY,
    current_message_count INTEGER NOT NULL DEFAULT 0,
    max_message_count INTEGER NOT NULL DEFAULT 0,
    topic_generation INTEGER NOT NULL DEFAULT 0,
    refresh_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS room_messages (
    id TEXT PRIMARY KEY,
    room_id TEXT NOT NULL,
    parent_message_id TEXT,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    suggestions TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,

    FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_room_messages_room ON room_messages(room_id, created_at);
";

/// A conversation session as owned by the room store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: String,
    pub current_message_count: u32,
    pub max_message_count: u32,
    /// Bumped every time the room store rotates the topic
    pub topic_generation: u32,
    pub refresh_reason: Option<String>,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            current_message_count: 0,
            max_message_count: 0,
            topic_generation: 0,
            refresh_reason: None,
        }
    }

    pub fn apply_throttle(&mut self, throttle: ThrottleSnapshot) {
        self.current_message_count = throttle.current;
        self.max_message_count = throttle.max;
    }

    /// Mirror a room store refresh: counters reset, generation bumped
    pub fn start_new_topic(&mut self, reason: &str) {
        self.current_message_count = 0;
        self.max_message_count = 0;
        self.topic_generation += 1;
        self.refresh_reason = Some(reason.to_string());
    }
}

/// Who authored a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Question,
    Answer,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Question => write!(f, "question"),
            MessageRole::Answer => write!(f, "answer"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(MessageRole::Question),
            "answer" => Ok(MessageRole::Answer),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

/// Entry appended to the message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub room_id: String,
    pub parent_message_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub suggestions: Vec<String>,
}

impl HistoryRecord {
    pub fn answer(
        room_id: impl Into<String>,
        question_message_id: impl Into<String>,
        content: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            parent_message_id: Some(question_message_id.into()),
            role: MessageRole::Answer,
            content: content.into(),
            suggestions,
        }
    }
}

/// A history entry as read back from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: HistoryRecord,
}
