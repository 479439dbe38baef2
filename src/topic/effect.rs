//! Effects produced by topic evaluation

use crate::reply::ReplyMessage;
use crate::throttle::ThrottleSnapshot;

/// Collaborator calls to perform after an evaluation, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Copy the throttle counters onto the session and persist it
    UpdateSession { throttle: ThrottleSnapshot },

    /// Append the answer to history, linked to the turn's question
    PersistAnswer {
        content: String,
        suggestions: Vec<String>,
    },

    /// Send the final reply to the client
    EmitFinal { reply: ReplyMessage },

    /// Ask the room store to rotate the session
    RefreshSession { reason: String },
}

impl Effect {
    pub fn persist_answer(reply: &ReplyMessage) -> Self {
        Effect::PersistAnswer {
            content: reply.content.clone(),
            suggestions: reply.suggestions.clone(),
        }
    }

    pub fn emit_final(reply: ReplyMessage) -> Self {
        Effect::EmitFinal { reply }
    }

    pub fn refresh(reason: &super::EndReason) -> Self {
        Effect::RefreshSession {
            reason: reason.to_string(),
        }
    }
}
