//! Property-based tests for topic evaluation
//!
//! These tests verify key invariants hold across all possible envelopes.

use super::*;
use crate::envelope::{CandidateMessage, FinalEnvelope};
use crate::throttle::ThrottleSnapshot;
use proptest::prelude::*;

fn arb_candidate() -> impl Strategy<Value = CandidateMessage> {
    (
        prop_oneof![Just("bot"), Just("user")],
        "[a-zA-Z ]{0,20}",
        proptest::collection::vec("[a-zA-Z ]{1,10}", 0..3),
    )
        .prop_map(|(author, text, suggestions)| CandidateMessage {
            author: author.to_string(),
            text,
            suggestions,
        })
}

fn arb_envelope() -> impl Strategy<Value = FinalEnvelope> {
    (
        prop_oneof![
            4 => Just("Success".to_string()),
            1 => Just("Failed".to_string()),
            1 => Just("Throttled".to_string()),
        ],
        proptest::collection::vec(arb_candidate(), 0..5),
        0u32..40,
        0u32..40,
    )
        .prop_map(|(status, candidates, current, max)| FinalEnvelope {
            status,
            status_message: None,
            candidates,
            throttle: Some(ThrottleSnapshot { current, max }),
        })
}

proptest! {
    #[test]
    fn prop_evaluation_is_idempotent(envelope in arb_envelope()) {
        let policy = TopicPolicy::default();
        let first = evaluate(&envelope, &policy).unwrap();
        let second = evaluate(&envelope, &policy).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_new_topic_iff_not_continuing(envelope in arb_envelope()) {
        let eval = evaluate(&envelope, &TopicPolicy::default()).unwrap();
        prop_assert_eq!(
            eval.decision.must_start_new_topic(),
            eval.decision.outcome() != TopicOutcome::Continuing
        );
    }

    #[test]
    fn prop_refresh_at_most_once_and_only_when_ending(envelope in arb_envelope()) {
        let eval = evaluate(&envelope, &TopicPolicy::default()).unwrap();
        let refreshes = eval
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::RefreshSession { .. }))
            .count();
        prop_assert_eq!(refreshes, usize::from(eval.decision.must_start_new_topic()));
    }

    #[test]
    fn prop_counters_only_updated_when_continuing(envelope in arb_envelope()) {
        let eval = evaluate(&envelope, &TopicPolicy::default()).unwrap();
        let updates = eval
            .effects
            .iter()
            .any(|e| matches!(e, Effect::UpdateSession { .. }));
        prop_assert_eq!(updates, eval.decision.outcome() == TopicOutcome::Continuing);
    }

    #[test]
    fn prop_reply_persisted_before_emitted(envelope in arb_envelope()) {
        let eval = evaluate(&envelope, &TopicPolicy::default()).unwrap();
        let persist = eval.effects.iter().position(|e| matches!(e, Effect::PersistAnswer { .. }));
        let emit = eval.effects.iter().position(|e| matches!(e, Effect::EmitFinal { .. }));
        match (persist, emit) {
            (Some(p), Some(e)) => prop_assert!(p < e),
            (None, None) => prop_assert!(eval.decision.reply().is_none()),
            _ => prop_assert!(false, "persist and emit must come together"),
        }
    }

    #[test]
    fn prop_no_bot_candidates_is_no_reply_end(
        texts in proptest::collection::vec("[a-z]{1,10}", 0..5),
        current in 0u32..40,
        max in 0u32..40,
    ) {
        let envelope = FinalEnvelope {
            status: "Success".to_string(),
            status_message: None,
            candidates: texts
                .into_iter()
                .map(|text| CandidateMessage { author: "user".to_string(), text, suggestions: vec![] })
                .collect(),
            throttle: Some(ThrottleSnapshot { current, max }),
        };
        let eval = evaluate(&envelope, &TopicPolicy::default()).unwrap();
        prop_assert_eq!(eval.decision.outcome(), TopicOutcome::NoReplyEnd);
    }
}
