//! Property-based tests for the dispatch graph
//!
//! These tests verify key invariants hold across all possible inputs.

use super::testing::MockGenerator;
use super::transition::{transition, TurnEvent, TurnPhase};
use super::{Decision, RoutingError, TurnError};
use crate::agents::{HandlerKind, HandlerRegistry, TableDemoAgent};
use crate::message::{DispatchInstruction, Message};
use proptest::prelude::*;
use std::sync::Arc;

fn registry() -> HandlerRegistry {
    HandlerRegistry::new(Arc::new(MockGenerator::new()))
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,40}".prop_map(Decision::Answer),
        ("[a-z_]{1,20}", "[a-zA-Z0-9 ]{0,20}").prop_map(|(target, topic)| {
            Decision::Dispatch(DispatchInstruction::new(target).with_argument("topic", topic))
        }),
    ]
}

proptest! {
    // Routing either terminates, enters exactly one handler, or fails
    // with a routing error. No decision loops back to routing.
    #[test]
    fn routing_never_revisits_routing(decision in arb_decision()) {
        let registry = registry();
        match transition(TurnPhase::Routing, &TurnEvent::Decided(decision), &registry) {
            Ok(next) => prop_assert!(matches!(
                next,
                TurnPhase::Done | TurnPhase::Handling(_)
            )),
            Err(err) => prop_assert!(matches!(err, TurnError::Routing(_))),
        }
    }

    #[test]
    fn unregistered_targets_always_raise_routing_errors(
        target in "[a-z_]{1,20}".prop_filter(
            "registered names excluded",
            |t| HandlerKind::from_name(t).is_none(),
        )
    ) {
        let registry = registry();
        let event = TurnEvent::Decided(Decision::Dispatch(DispatchInstruction::new(&target)));
        let err = transition(TurnPhase::Routing, &event, &registry).unwrap_err();
        match err {
            TurnError::Routing(RoutingError::UnknownHandler(name)) => {
                prop_assert_eq!(name, target);
            }
            other => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    #[test]
    fn handling_always_terminates(kind in prop_oneof![
        Just(HandlerKind::Conversational),
        Just(HandlerKind::ContentGeneration),
    ]) {
        let registry = registry();
        let next = transition(TurnPhase::Handling(kind), &TurnEvent::Handled, &registry).unwrap();
        prop_assert_eq!(next, TurnPhase::Done);
    }

    // Same topic in, byte-identical artifact out.
    #[test]
    fn table_payload_is_deterministic(topic in "[a-zA-Z0-9 äöüß]{0,40}") {
        let agent = TableDemoAgent;
        let history = vec![Message::assistant_dispatch(
            "",
            DispatchInstruction::new("content_generation").with_argument("topic", &topic),
        )];
        let first = agent.handle(&history);
        let second = agent.handle(&history);
        let first_hint = first.render_hint.unwrap();
        let second_hint = second.render_hint.unwrap();
        prop_assert_eq!(&first_hint.payload, &second_hint.payload);
        prop_assert!(first_hint.payload.contains(topic.as_str()));
    }
}
