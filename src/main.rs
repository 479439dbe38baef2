//! Topic relay replay
//!
//! Replays a captured backend stream through one turn against the `SQLite`
//! room and history stores, printing every outbound payload as a JSON line.
//!
//! Usage: `topic-relay-replay <capture-file> <room-id> <question-message-id>`

use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use topic_relay::emitter::ChannelSink;
use topic_relay::envelope::RECORD_SEPARATOR;
use topic_relay::store::SqliteStore;
use topic_relay::{RelayConfig, TurnContext, TurnRelay};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topic_relay=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(capture), Some(room_id), Some(question_id)) = (args.next(), args.next(), args.next())
    else {
        return Err("usage: topic-relay-replay <capture-file> <room-id> <question-message-id>".into());
    };

    // Configuration
    let config = RelayConfig::from_env();

    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening database");
    let store = SqliteStore::open(&config.db_path)?;
    let session = store.get_or_create_room(&room_id)?;

    // Pump the capture file line by line, the way a transport would deliver it
    let file = tokio::fs::File::open(&capture).await?;
    let (chunk_tx, chunk_rx) = mpsc::channel::<String>(64);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end_matches(RECORD_SEPARATOR);
            if line.trim().is_empty() {
                continue;
            }
            if chunk_tx.send(format!("{line}{RECORD_SEPARATOR}")).await.is_err() {
                break;
            }
        }
        Ok::<_, std::io::Error>(())
    });

    let (sink, mut outbound) = ChannelSink::channel(64);
    let printer = tokio::spawn(async move {
        while let Some(payload) = outbound.recv().await {
            match serde_json::to_string(&payload) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode payload"),
            }
        }
    });

    let relay = TurnRelay::new(
        config.policy.clone(),
        TurnContext::new(session, question_id),
        store.clone(),
        store,
        sink,
    );
    let outcome = relay.run(ReceiverStream::new(chunk_rx)).await?;

    printer.await?;
    reader.await??;

    tracing::info!(
        room_id = %room_id,
        outcome = ?outcome.decision.outcome(),
        must_start_new_topic = outcome.must_start_new_topic(),
        partials = outcome.partials_forwarded,
        "Replay finished"
    );

    Ok(())
}
