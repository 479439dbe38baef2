//! Relay error types

use thiserror::Error;

/// Failures that abort processing of a turn.
///
/// Topic-ending outcomes (non-success status, missing bot reply, exhausted
/// message budget) are not errors; they are carried by
/// [`TopicDecision`](crate::topic::TopicDecision).
#[derive(Debug, Error)]
pub enum RelayError {
    /// A backend record is missing required fields or is not valid JSON.
    /// Nothing has been applied yet when this is raised.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),
    /// The outbound sink rejected a send (client went away)
    #[error("Transport closed: {0}")]
    TransportClosed(String),
    /// A room or history collaborator call failed
    #[error("Store error: {0}")]
    Store(String),
    /// The inbound stream ended before a final result arrived
    #[error("Turn ended without a final result")]
    IncompleteTurn,
}

impl RelayError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope(message.into())
    }

    pub fn is_transport_closed(&self) -> bool {
        matches!(self, Self::TransportClosed(_))
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedEnvelope(e.to_string())
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
