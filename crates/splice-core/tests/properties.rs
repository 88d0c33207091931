//! Property tests over generated event trees

use proptest::prelude::*;
use splice_core::{Event, Prune, Result, Splice};
use splice_test_utils::{framed, framed_ok, ScriptedEvaluator};

/// Plain words that can never be mistaken for a marker
fn word() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

/// Events of one node: a scalar, a sequence, or a mapping of scalar keys
fn node() -> impl Strategy<Value = Vec<Event>> {
    let leaf = word().prop_map(|w| vec![Event::scalar(w)]);
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(|items| {
                let mut events = vec![Event::sequence_start()];
                events.extend(items.into_iter().flatten());
                events.push(Event::SequenceEnd);
                events
            }),
            proptest::collection::vec((word(), inner), 0..6).prop_map(|entries| {
                let mut events = vec![Event::mapping_start()];
                for (key, value) in entries {
                    events.push(Event::scalar(key));
                    events.extend(value);
                }
                events.push(Event::MappingEnd);
                events
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_unmarked_stream_is_unchanged(body in node()) {
        let mut evaluator = ScriptedEvaluator::new();
        let out: Vec<Event> = Splice::new(framed_ok(body.clone()), &mut evaluator)
            .collect::<Result<_>>()
            .unwrap();

        prop_assert_eq!(out, framed(body));
        prop_assert!(evaluator.calls.is_empty());
    }

    #[test]
    fn prop_pruning_keeps_non_empty_documents_in_order(
        documents in proptest::collection::vec(proptest::option::of(node()), 0..6)
    ) {
        let mut input = vec![Event::StreamStart];
        let mut expected = vec![Event::StreamStart];
        for document in &documents {
            input.push(Event::document_start());
            if let Some(body) = document {
                input.extend(body.iter().cloned());
                expected.push(Event::document_start());
                expected.extend(body.iter().cloned());
                expected.push(Event::document_end());
            }
            input.push(Event::document_end());
        }
        input.push(Event::StreamEnd);
        expected.push(Event::StreamEnd);

        let out: Vec<Event> = Prune::new(input.into_iter().map(Ok))
            .collect::<Result<_>>()
            .unwrap();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_sequence_splice_concatenates(
        before in proptest::collection::vec(word(), 0..5),
        produced in proptest::collection::vec(word(), 0..5),
        after in proptest::collection::vec(word(), 0..5),
    ) {
        let reply = format!("[{}]", produced.join(", "));
        let mut evaluator = ScriptedEvaluator::new().reply_yaml(reply);

        let mut body = vec![Event::sequence_start()];
        body.extend(before.iter().map(Event::scalar));
        body.push(Event::scalar("(@py items()@)"));
        body.extend(after.iter().map(Event::scalar));
        body.push(Event::SequenceEnd);

        let out: Vec<Event> = Splice::new(framed_ok(body), &mut evaluator)
            .collect::<Result<_>>()
            .unwrap();
        let values: Vec<&str> = out.iter().filter_map(Event::scalar_text).collect();

        let expected: Vec<&str> = before
            .iter()
            .chain(&produced)
            .chain(&after)
            .map(String::as_str)
            .collect();
        prop_assert_eq!(values, expected);
    }
}
