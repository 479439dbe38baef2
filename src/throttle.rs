//! Throttle evaluation

use serde::{Deserialize, Serialize};

/// Backend-reported usage counters for the current topic.
///
/// The backend may move either counter between turns; they are compared
/// as received and never adjusted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleSnapshot {
    pub current: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleVerdict {
    Ok,
    LimitExceeded,
}

/// The boundary message itself (`current == max`) is still answerable.
pub fn evaluate(snapshot: ThrottleSnapshot) -> ThrottleVerdict {
    if snapshot.current > snapshot.max {
        ThrottleVerdict::LimitExceeded
    } else {
        ThrottleVerdict::Ok
    }
}
