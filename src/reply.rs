//! Reply extraction from final envelopes

use crate::envelope::CandidateMessage;
use crate::throttle::ThrottleSnapshot;
use serde::{Deserialize, Serialize};

/// Text and follow-ups taken from the authoritative bot message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFragment {
    pub content: String,
    pub suggestions: Vec<String>,
}

impl ReplyFragment {
    /// Attach the throttle counters that travel with the reply
    pub fn into_reply(self, throttle: ThrottleSnapshot) -> ReplyMessage {
        ReplyMessage {
            content: self.content,
            suggestions: self.suggestions,
            current_count: throttle.current,
            max_count: throttle.max,
        }
    }
}

/// The normalized answer sent to the client and kept in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub content: String,
    /// Never absent; empty when the backend offered no follow-ups
    pub suggestions: Vec<String>,
    pub current_count: u32,
    pub max_count: u32,
}

/// First candidate authored by `bot_author`, in original order.
///
/// `None` means the backend declined to answer.
pub fn extract(candidates: &[CandidateMessage], bot_author: &str) -> Option<ReplyFragment> {
    candidates
        .iter()
        .find(|c| c.author == bot_author)
        .map(|c| ReplyFragment {
            content: c.text.clone(),
            suggestions: c.suggestions.clone(),
        })
}
