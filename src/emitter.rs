//! Stream emitter adapter
//!
//! Wraps the outbound sink so decoding and evaluation never see transport
//! errors: every sink failure becomes [`RelayError::TransportClosed`].

use crate::error::{RelayError, RelayResult};
use crate::reply::ReplyMessage;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Payloads pushed to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundPayload {
    Partial { content: String },
    Final(ReplyMessage),
}

/// Transport towards the client
#[async_trait]
pub trait OutboundSink: Send + Sync {
    /// Deliver one payload; an error means the client is gone
    async fn send(&self, payload: OutboundPayload) -> Result<(), String>;
}

#[async_trait]
impl<T: OutboundSink + ?Sized> OutboundSink for Arc<T> {
    async fn send(&self, payload: OutboundPayload) -> Result<(), String> {
        (**self).send(payload).await
    }
}

/// Sink backed by a tokio channel; a dropped receiver closes it
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<OutboundPayload>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<OutboundPayload>) -> Self {
        Self { tx }
    }

    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<OutboundPayload>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl OutboundSink for ChannelSink {
    async fn send(&self, payload: OutboundPayload) -> Result<(), String> {
        self.tx
            .send(payload)
            .await
            .map_err(|_| "client receiver dropped".to_string())
    }
}

/// Forwards partial and final messages in call order.
///
/// Once the sink has failed the emitter stays closed and rejects further
/// sends without touching the sink.
pub struct StreamEmitter<K: OutboundSink> {
    sink: K,
    closed: bool,
    partials_sent: usize,
}

impl<K: OutboundSink> StreamEmitter<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            closed: false,
            partials_sent: 0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn partials_sent(&self) -> usize {
        self.partials_sent
    }

    pub async fn emit_partial(&mut self, text: &str) -> RelayResult<()> {
        self.send(OutboundPayload::Partial {
            content: text.to_string(),
        })
        .await?;
        self.partials_sent += 1;
        Ok(())
    }

    pub async fn emit_final(&mut self, reply: &ReplyMessage) -> RelayResult<()> {
        self.send(OutboundPayload::Final(reply.clone())).await
    }

    async fn send(&mut self, payload: OutboundPayload) -> RelayResult<()> {
        if self.closed {
            return Err(RelayError::TransportClosed("sink already closed".to_string()));
        }
        self.sink.send(payload).await.map_err(|e| {
            self.closed = true;
            RelayError::TransportClosed(e)
        })
    }
}
