//! Turn relay executor

use super::{TurnContext, TurnOutcome};
use crate::emitter::{OutboundSink, StreamEmitter};
use crate::envelope::{self, FinalEnvelope, Frame, PartialEnvelope, RecordBuffer, StreamEnvelope};
use crate::error::{RelayError, RelayResult};
use crate::reply::ReplyMessage;
use crate::store::{HistoryRecord, HistoryStore, RoomStore};
use crate::topic::{self, Effect, EndReason, Evaluation, TopicDecision, TopicPolicy};
use futures::{Stream, StreamExt};

/// Relay for a single turn, generic over its collaborators
pub struct TurnRelay<R, H, K>
where
    R: RoomStore,
    H: HistoryStore,
    K: OutboundSink,
{
    policy: TopicPolicy,
    context: TurnContext,
    rooms: R,
    history: H,
    emitter: StreamEmitter<K>,
    /// Set once the room store has been asked to rotate the session
    refreshed: bool,
    /// Set when the client went away; the rest of the turn is skipped
    aborted: Option<TopicDecision>,
}

impl<R, H, K> TurnRelay<R, H, K>
where
    R: RoomStore,
    H: HistoryStore,
    K: OutboundSink,
{
    pub fn new(policy: TopicPolicy, context: TurnContext, rooms: R, history: H, sink: K) -> Self {
        Self {
            policy,
            context,
            rooms,
            history,
            emitter: StreamEmitter::new(sink),
            refreshed: false,
            aborted: None,
        }
    }

    pub fn context(&self) -> &TurnContext {
        &self.context
    }

    /// Entry point for a record known to be a partial update.
    ///
    /// Returns whether a new topic must be started (the client went away).
    pub async fn handle_partial(&mut self, raw: &str) -> RelayResult<bool> {
        let envelope = envelope::decode_partial(raw)?;
        Ok(self.forward_partial(&envelope).await?.is_some())
    }

    /// Entry point for a record known to be a final result.
    ///
    /// Returns whether a new topic must be started.
    pub async fn handle_final(&mut self, raw: &str) -> RelayResult<bool> {
        let envelope = envelope::decode_final(raw)?;
        Ok(self.process_final(&envelope).await?.must_start_new_topic())
    }

    /// Consume a chunked backend stream until its final result
    pub async fn run<S>(mut self, chunks: S) -> RelayResult<TurnOutcome>
    where
        S: Stream<Item = String>,
    {
        let mut chunks = std::pin::pin!(chunks);
        let mut buffer = RecordBuffer::new();

        while let Some(chunk) = chunks.next().await {
            for record in buffer.push(&chunk)? {
                if let Some(decision) = self.process_record(&record).await? {
                    return Ok(self.finish(decision));
                }
            }
        }

        if let Some(record) = buffer.finish() {
            if let Some(decision) = self.process_record(&record).await? {
                return Ok(self.finish(decision));
            }
        }

        Err(RelayError::IncompleteTurn)
    }

    /// Evaluate a final result and carry out its effects
    pub async fn process_final(&mut self, envelope: &FinalEnvelope) -> RelayResult<TopicDecision> {
        if let Some(decision) = &self.aborted {
            return Ok(decision.clone());
        }

        let Evaluation { decision, effects } = topic::evaluate(envelope, &self.policy)?;

        for effect in effects {
            match self.execute_effect(effect).await {
                Ok(()) => {}
                Err(e) if e.is_transport_closed() => {
                    return self.abort_turn(decision.reply().cloned()).await;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(decision)
    }

    async fn process_record(&mut self, record: &str) -> RelayResult<Option<TopicDecision>> {
        match envelope::decode(record)? {
            Frame::Ping => Ok(None),
            Frame::Unknown(kind) => {
                tracing::debug!(
                    room_id = %self.context.session.id,
                    kind,
                    "Skipping unrecognized record"
                );
                Ok(None)
            }
            Frame::Completed => Err(RelayError::IncompleteTurn),
            Frame::Envelope(StreamEnvelope::Partial(partial)) => {
                self.forward_partial(&partial).await
            }
            Frame::Envelope(StreamEnvelope::Final(result)) => {
                self.process_final(&result).await.map(Some)
            }
        }
    }

    /// Forward a partial update. `Some` means the turn ended.
    async fn forward_partial(
        &mut self,
        envelope: &PartialEnvelope,
    ) -> RelayResult<Option<TopicDecision>> {
        if let Some(decision) = &self.aborted {
            return Ok(Some(decision.clone()));
        }
        let Some(text) = envelope.text() else {
            return Ok(None);
        };

        match self.emitter.emit_partial(text).await {
            Ok(()) => Ok(None),
            Err(e) if e.is_transport_closed() => self.abort_turn(None).await.map(Some),
            Err(e) => Err(e),
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> RelayResult<()> {
        match effect {
            Effect::UpdateSession { throttle } => {
                self.context.session.apply_throttle(throttle);
                self.rooms
                    .update(&self.context.session)
                    .await
                    .map_err(RelayError::Store)
            }
            Effect::PersistAnswer {
                content,
                suggestions,
            } => {
                let record = HistoryRecord::answer(
                    &self.context.session.id,
                    &self.context.question_message_id,
                    content,
                    suggestions,
                );
                self.history.append(&record).await.map_err(RelayError::Store)
            }
            Effect::EmitFinal { reply } => self.emitter.emit_final(&reply).await,
            Effect::RefreshSession { reason } => self.refresh(&reason).await,
        }
    }

    /// The client disconnected: stop the turn and force a new topic
    async fn abort_turn(
        &mut self,
        reply: Option<ReplyMessage>,
    ) -> RelayResult<TopicDecision> {
        let reason = EndReason::ClientDisconnected;
        self.refresh(&reason.to_string()).await?;
        let decision = TopicDecision::EndTopic { reason, reply };
        self.aborted = Some(decision.clone());
        Ok(decision)
    }

    async fn refresh(&mut self, reason: &str) -> RelayResult<()> {
        if self.refreshed {
            tracing::debug!(
                room_id = %self.context.session.id,
                reason,
                "Session already refreshed this turn"
            );
            return Ok(());
        }

        tracing::warn!(
            room_id = %self.context.session.id,
            reason,
            "Forcing new topic"
        );
        self.rooms
            .refresh(&self.context.session, reason)
            .await
            .map_err(RelayError::Store)?;
        self.context.session.start_new_topic(reason);
        self.refreshed = true;
        Ok(())
    }

    fn finish(self, decision: TopicDecision) -> TurnOutcome {
        tracing::debug!(
            room_id = %self.context.session.id,
            outcome = ?decision.outcome(),
            partials = self.emitter.partials_sent(),
            "Turn finished"
        );
        TurnOutcome {
            decision,
            partials_forwarded: self.emitter.partials_sent(),
            session: self.context.session,
        }
    }
}
