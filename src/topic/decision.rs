//! Decision values produced by the controller

use crate::reply::ReplyMessage;
use std::fmt;

/// Why the current topic has to be discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The backend reported something other than success
    Status {
        status: String,
        message: Option<String>,
    },
    NoBotReply,
    BudgetExceeded,
    ClientDisconnected,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Status {
                status,
                message: Some(message),
            } => write!(f, "non-success status: {status} ({message})"),
            EndReason::Status {
                status,
                message: None,
            } => write!(f, "non-success status: {status}"),
            EndReason::NoBotReply => f.write_str("no eligible bot reply"),
            EndReason::BudgetExceeded => f.write_str("message budget exceeded"),
            EndReason::ClientDisconnected => f.write_str("client disconnected"),
        }
    }
}

/// Result of evaluating one final envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicDecision {
    /// The topic goes on; the reply is answered normally
    Continue(ReplyMessage),
    /// The topic ends. `reply` is set when an answer was produced first.
    EndTopic {
        reason: EndReason,
        reply: Option<ReplyMessage>,
    },
    /// The backend succeeded but no candidate came from the bot
    NoBotReply { reason: EndReason },
}

/// Terminal state reached by an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicOutcome {
    Continuing,
    ForcedEnd,
    NoReplyEnd,
    StatusEnd,
}

impl TopicDecision {
    pub fn outcome(&self) -> TopicOutcome {
        match self {
            TopicDecision::Continue(_) => TopicOutcome::Continuing,
            TopicDecision::NoBotReply { .. } => TopicOutcome::NoReplyEnd,
            TopicDecision::EndTopic {
                reason: EndReason::Status { .. },
                ..
            } => TopicOutcome::StatusEnd,
            TopicDecision::EndTopic { .. } => TopicOutcome::ForcedEnd,
        }
    }

    /// The only signal the caller needs before the next user turn
    pub fn must_start_new_topic(&self) -> bool {
        !matches!(self, TopicDecision::Continue(_))
    }

    pub fn reason(&self) -> Option<&EndReason> {
        match self {
            TopicDecision::Continue(_) => None,
            TopicDecision::EndTopic { reason, .. } | TopicDecision::NoBotReply { reason } => {
                Some(reason)
            }
        }
    }

    pub fn reply(&self) -> Option<&ReplyMessage> {
        match self {
            TopicDecision::Continue(reply) => Some(reply),
            TopicDecision::EndTopic { reply, .. } => reply.as_ref(),
            TopicDecision::NoBotReply { .. } => None,
        }
    }
}
