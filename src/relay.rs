//! Turn orchestration
//!
//! Drives one turn's inbound backend stream: partial updates go straight to
//! the client, the final result is evaluated by the topic controller and its
//! effects are carried out against the room, history and outbound
//! collaborators.

mod executor;


pub use executor::TurnRelay;

use crate::store::ConversationSession;
use crate::topic::TopicDecision;

/// What the relay needs to know about the turn it serves
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub session: ConversationSession,
    /// History id of the user question this turn answers
    pub question_message_id: String,
}

impl TurnContext {
    pub fn new(session: ConversationSession, question_message_id: impl Into<String>) -> Self {
        Self {
            session,
            question_message_id: question_message_id.into(),
        }
    }
}

/// Result handed back to the turn's caller
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub decision: TopicDecision,
    /// Session as left by this turn (counters applied on the happy path)
    pub session: ConversationSession,
    pub partials_forwarded: usize,
}

impl TurnOutcome {
    /// Whether the conversation must be reset before the next user turn
    pub fn must_start_new_topic(&self) -> bool {
        self.decision.must_start_new_topic()
    }
}
