//! Collaborator traits consumed by the relay
//!
//! These traits enable testing the relay with mock implementations.

use super::{ConversationSession, HistoryRecord, SqliteStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Room/session store
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Reset or rotate the session, recording why
    async fn refresh(&self, session: &ConversationSession, reason: &str) -> Result<(), String>;

    /// Persist the session's throttle counters
    async fn update(&self, session: &ConversationSession) -> Result<(), String>;
}

/// Append-only message history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &HistoryRecord) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: RoomStore + ?Sized> RoomStore for Arc<T> {
    async fn refresh(&self, session: &ConversationSession, reason: &str) -> Result<(), String> {
        (**self).refresh(session, reason).await
    }

    async fn update(&self, session: &ConversationSession) -> Result<(), String> {
        (**self).update(session).await
    }
}

#[async_trait]
impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    async fn append(&self, record: &HistoryRecord) -> Result<(), String> {
        (**self).append(record).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl RoomStore for SqliteStore {
    async fn refresh(&self, session: &ConversationSession, reason: &str) -> Result<(), String> {
        self.refresh_room(&session.id, reason)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn update(&self, session: &ConversationSession) -> Result<(), String> {
        self.update_counters(session).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    async fn append(&self, record: &HistoryRecord) -> Result<(), String> {
        self.append_message(record)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
