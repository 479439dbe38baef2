//! Property-based tests for record framing and final-result decoding

use super::*;
use proptest::prelude::*;
use serde_json::json;

fn arb_record() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,20}".prop_map(|text| {
        json!({
            "type": 1,
            "arguments": [{ "messages": [{ "text": text }] }]
        })
        .to_string()
    })
}

fn arb_candidate() -> impl Strategy<Value = (String, String, Vec<String>)> {
    (
        prop_oneof![Just("bot".to_string()), Just("user".to_string())],
        "[a-zA-Z0-9 ]{0,30}",
        proptest::collection::vec("[a-zA-Z ]{1,15}", 0..4),
    )
}

proptest! {
    /// However the stream is cut into chunks, the same records come out in order
    #[test]
    fn prop_chunking_preserves_records(
        records in proptest::collection::vec(arb_record(), 1..8),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let stream: String = records
            .iter()
            .map(|r| format!("{r}{RECORD_SEPARATOR}"))
            .collect();

        // Records and separators are ASCII, so every byte index is a char boundary
        let mut positions: Vec<usize> = cuts.iter().map(|i| i.index(stream.len())).collect();
        positions.sort_unstable();
        positions.dedup();

        let mut chunks = Vec::new();
        let mut rest = stream.clone();
        for pos in positions.iter().rev() {
            chunks.push(rest.split_off(*pos));
        }
        chunks.push(rest);
        chunks.reverse();

        let mut buffer = RecordBuffer::new();
        let mut seen = Vec::new();
        for chunk in &chunks {
            seen.extend(buffer.push(chunk).unwrap());
        }
        prop_assert!(buffer.finish().is_none());
        prop_assert_eq!(seen, records);
    }

    /// Candidate order and suggestion lists survive decoding
    #[test]
    fn prop_final_preserves_candidates(
        candidates in proptest::collection::vec(arb_candidate(), 0..6),
        current in 0u32..100,
        max in 0u32..100,
    ) {
        let messages: Vec<_> = candidates
            .iter()
            .map(|(author, text, suggestions)| json!({
                "author": author,
                "text": text,
                "suggestedResponses": suggestions.iter().map(|s| json!({ "text": s })).collect::<Vec<_>>(),
            }))
            .collect();
        let raw = json!({
            "type": 2,
            "item": {
                "messages": messages,
                "result": { "value": "Success" },
                "throttling": {
                    "numUserMessagesInConversation": current,
                    "maxNumUserMessagesInConversation": max,
                }
            }
        })
        .to_string();

        let envelope = decode_final(&raw).unwrap();
        prop_assert_eq!(envelope.candidates.len(), candidates.len());
        for (decoded, (author, text, suggestions)) in envelope.candidates.iter().zip(&candidates) {
            prop_assert_eq!(&decoded.author, author);
            prop_assert_eq!(&decoded.text, text);
            prop_assert_eq!(&decoded.suggestions, suggestions);
        }
        prop_assert_eq!(envelope.throttle, Some(ThrottleSnapshot { current, max }));
    }
}
