//! Pure evaluation of final envelopes
//!
//! Rules are checked in order and the first match wins:
//! 1. non-success status ends the topic
//! 2. no bot-authored candidate ends the topic
//! 3. an exceeded message budget answers once, then ends the topic
//! 4. otherwise the topic continues

use super::{EndReason, Effect, TopicDecision};
use crate::envelope::FinalEnvelope;
use crate::error::{RelayError, RelayResult};
use crate::reply;
use crate::throttle::{self, ThrottleVerdict};

/// Backend identities the controller compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPolicy {
    /// Author tag of messages eligible as the reply
    pub bot_author: String,
    /// Status value the backend reports on a normal answer
    pub success_status: String,
}

impl Default for TopicPolicy {
    fn default() -> Self {
        Self {
            bot_author: "bot".to_string(),
            success_status: "Success".to_string(),
        }
    }
}

/// Decision for one final envelope plus the effects that realize it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: TopicDecision,
    pub effects: Vec<Effect>,
}

impl Evaluation {
    fn new(decision: TopicDecision) -> Self {
        Self {
            decision,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Evaluate a final envelope.
///
/// This function is pure: the same envelope and policy always give the
/// same evaluation. The only failure is a successful result that carries a
/// reply but no throttle counters, which cannot be judged.
pub fn evaluate(envelope: &FinalEnvelope, policy: &TopicPolicy) -> RelayResult<Evaluation> {
    if envelope.status != policy.success_status {
        let reason = EndReason::Status {
            status: envelope.status.clone(),
            message: envelope.status_message.clone(),
        };
        let refresh = Effect::refresh(&reason);
        return Ok(Evaluation::new(TopicDecision::EndTopic {
            reason,
            reply: None,
        })
        .with_effect(refresh));
    }

    let Some(fragment) = reply::extract(&envelope.candidates, &policy.bot_author) else {
        let reason = EndReason::NoBotReply;
        let refresh = Effect::refresh(&reason);
        return Ok(Evaluation::new(TopicDecision::NoBotReply { reason }).with_effect(refresh));
    };

    let throttle = envelope
        .throttle
        .ok_or_else(|| RelayError::malformed("successful result without throttling"))?;
    let reply = fragment.into_reply(throttle);

    match throttle::evaluate(throttle) {
        ThrottleVerdict::LimitExceeded => {
            let reason = EndReason::BudgetExceeded;
            let refresh = Effect::refresh(&reason);
            Ok(Evaluation::new(TopicDecision::EndTopic {
                reason,
                reply: Some(reply.clone()),
            })
            .with_effect(Effect::persist_answer(&reply))
            .with_effect(Effect::emit_final(reply))
            .with_effect(refresh))
        }
        ThrottleVerdict::Ok => Ok(Evaluation::new(TopicDecision::Continue(reply.clone()))
            .with_effect(Effect::UpdateSession { throttle })
            .with_effect(Effect::persist_answer(&reply))
            .with_effect(Effect::emit_final(reply))),
    }
}
