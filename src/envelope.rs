//! Payload decoder
//!
//! Turns raw backend records into typed envelopes. The backend tags each
//! record with a numeric `type`: partial updates stream the answer as it is
//! generated, a single final result closes it with status, candidate
//! messages and throttle counters.

mod wire;

#[cfg(test)]
mod proptests;

use crate::error::{RelayError, RelayResult};
use crate::throttle::ThrottleSnapshot;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wire::{WireFinal, WireMessage, WirePartial};

/// Separator between JSON records on the backend stream
pub const RECORD_SEPARATOR: char = '\u{1e}';

const TYPE_PARTIAL: u64 = 1;
const TYPE_FINAL: u64 = 2;
const TYPE_COMPLETED: u64 = 3;
const TYPE_PING: u64 = 6;

/// Upper bound on an unterminated record held by [`RecordBuffer`]
pub const MAX_PENDING_RECORD: usize = 1024 * 1024;

/// A decoded backend envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnvelope {
    Partial(PartialEnvelope),
    Final(FinalEnvelope),
}

/// Incremental fragment of the in-progress answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEnvelope {
    pub arguments: Vec<ArgumentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentBlock {
    /// Message fragments in arrival order; a fragment may carry no text
    pub fragments: Vec<Option<String>>,
}

impl PartialEnvelope {
    /// Text of the first fragment of the first argument block, if any
    pub fn text(&self) -> Option<&str> {
        self.arguments
            .first()?
            .fragments
            .first()?
            .as_deref()
    }
}

/// Terminating envelope of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalEnvelope {
    /// Outcome status reported by the backend (e.g. `Success`)
    pub status: String,
    /// Optional diagnostic the backend attaches to the status
    pub status_message: Option<String>,
    pub candidates: Vec<CandidateMessage>,
    /// Absent on results that never reached the model
    pub throttle: Option<ThrottleSnapshot>,
}

/// One candidate reply inside a final envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMessage {
    pub author: String,
    pub text: String,
    pub suggestions: Vec<String>,
}

/// One record from the backend stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Envelope(StreamEnvelope),
    /// Keep-alive; carries nothing
    Ping,
    /// The backend closed the invocation
    Completed,
    /// A record type this relay does not act on
    Unknown(u64),
}

/// Decode a record, detecting its shape from the `type` discriminator
pub fn decode(raw: &str) -> RelayResult<Frame> {
    let value: Value = serde_json::from_str(trim_record(raw))?;
    let kind = value
        .get("type")
        .and_then(Value::as_u64)
        .ok_or_else(|| RelayError::malformed("record has no numeric `type`"))?;

    match kind {
        TYPE_PARTIAL => partial_from_value(value)
            .map(|p| Frame::Envelope(StreamEnvelope::Partial(p))),
        TYPE_FINAL => final_from_value(value).map(|f| Frame::Envelope(StreamEnvelope::Final(f))),
        TYPE_COMPLETED => Ok(Frame::Completed),
        TYPE_PING => Ok(Frame::Ping),
        other => Ok(Frame::Unknown(other)),
    }
}

/// Decode a record known to be a partial update
pub fn decode_partial(raw: &str) -> RelayResult<PartialEnvelope> {
    partial_from_value(serde_json::from_str(trim_record(raw))?)
}

/// Decode a record known to be a final result
pub fn decode_final(raw: &str) -> RelayResult<FinalEnvelope> {
    final_from_value(serde_json::from_str(trim_record(raw))?)
}

/// Split one transport chunk into its non-empty records
pub fn split_records(chunk: &str) -> impl Iterator<Item = &str> {
    chunk
        .split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|record| !record.is_empty())
}

/// Reassembles records that straddle transport chunk boundaries
#[derive(Debug, Default)]
pub struct RecordBuffer {
    pending: String,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every record it completed, in order.
    ///
    /// Fails once an unterminated record grows past [`MAX_PENDING_RECORD`].
    pub fn push(&mut self, chunk: &str) -> RelayResult<Vec<String>> {
        self.pending.push_str(chunk);
        let records = match self.pending.rfind(RECORD_SEPARATOR) {
            Some(last) => {
                let tail = self.pending.split_off(last + RECORD_SEPARATOR.len_utf8());
                let complete = std::mem::replace(&mut self.pending, tail);
                split_records(&complete).map(str::to_string).collect()
            }
            None => Vec::new(),
        };
        if self.pending.len() > MAX_PENDING_RECORD {
            return Err(RelayError::malformed(format!(
                "unterminated record exceeds {MAX_PENDING_RECORD} bytes"
            )));
        }
        Ok(records)
    }

    /// Flush whatever is left once the stream has ended
    pub fn finish(self) -> Option<String> {
        let rest = self.pending.trim();
        (!rest.is_empty()).then(|| rest.to_string())
    }
}

fn trim_record(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == RECORD_SEPARATOR || c.is_whitespace())
}

fn parse<T: DeserializeOwned>(value: Value) -> RelayResult<T> {
    Ok(serde_json::from_value(value)?)
}

fn partial_from_value(value: Value) -> RelayResult<PartialEnvelope> {
    let wire: WirePartial = parse(value)?;
    let arguments = wire
        .arguments
        .filter(|args| !args.is_empty())
        .ok_or_else(|| RelayError::malformed("partial update has no arguments"))?;

    let arguments = arguments
        .into_iter()
        .map(|arg| ArgumentBlock {
            fragments: arg
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|m| m.text)
                .collect(),
        })
        .collect();

    Ok(PartialEnvelope { arguments })
}

fn final_from_value(value: Value) -> RelayResult<FinalEnvelope> {
    let wire: WireFinal = parse(value)?;
    let item = wire
        .item
        .ok_or_else(|| RelayError::malformed("final result has no item"))?;
    let result = item
        .result
        .ok_or_else(|| RelayError::malformed("final result has no result"))?;
    let status = result
        .value
        .ok_or_else(|| RelayError::malformed("final result has no status value"))?;

    let candidates = item
        .messages
        .unwrap_or_default()
        .into_iter()
        .map(candidate_from_wire)
        .collect();

    // A partial throttling block counts as absent
    let throttle = item.throttling.and_then(|t| {
        Some(ThrottleSnapshot {
            current: t.num_user_messages_in_conversation?,
            max: t.max_num_user_messages_in_conversation?,
        })
    });

    Ok(FinalEnvelope {
        status,
        status_message: result.message,
        candidates,
        throttle,
    })
}

fn candidate_from_wire(message: WireMessage) -> CandidateMessage {
    CandidateMessage {
        author: message.author.unwrap_or_default(),
        text: message.text.unwrap_or_default(),
        suggestions: message
            .suggested_responses
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.text)
            .collect(),
    }
}
