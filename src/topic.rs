//! Topic-continuity controller
//!
//! Pure evaluation of a final envelope into a [`TopicDecision`] plus the
//! ordered [`Effect`]s the turn orchestrator must perform. Nothing here
//! touches a store or the transport.

mod controller;
mod decision;
mod effect;

#[cfg(test)]
mod proptests;

pub use controller::{evaluate, Evaluation, TopicPolicy};
pub use decision::{EndReason, TopicDecision, TopicOutcome};
pub use effect::Effect;
