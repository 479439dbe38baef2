//! Topic relay
//!
//! Consumes the streamed answer of a conversational backend for one turn,
//! forwards it to the client, enforces the backend's message budget and
//! decides when the conversation topic has to be restarted.

#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod config;
pub mod emitter;
pub mod envelope;
pub mod error;
pub mod relay;
pub mod reply;
pub mod store;
pub mod throttle;
pub mod topic;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use relay::{TurnContext, TurnOutcome, TurnRelay};
pub use topic::{TopicDecision, TopicOutcome, TopicPolicy};
