//! Environment-driven configuration

use crate::topic::TopicPolicy;

/// Configuration for the relay and its default collaborators
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub policy: TopicPolicy,
    /// `SQLite` file backing the room and history stores
    pub db_path: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let defaults = TopicPolicy::default();
        let policy = TopicPolicy {
            bot_author: std::env::var("TOPIC_RELAY_BOT_AUTHOR").unwrap_or(defaults.bot_author),
            success_status: std::env::var("TOPIC_RELAY_SUCCESS_STATUS")
                .unwrap_or(defaults.success_status),
        };

        let db_path = std::env::var("TOPIC_RELAY_DB_PATH").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{home}/.topic-relay/relay.db")
        });

        Self { policy, db_path }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            policy: TopicPolicy::default(),
            db_path: "relay.db".to_string(),
        }
    }
}
