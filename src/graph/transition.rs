//! Pure phase transition function
//!
//! Given the current phase and an event, computes the next phase with
//! no I/O. The driver in `turn.rs` performs the collaborator calls and
//! feeds their results in as events.

use super::{Decision, RoutingError, TurnError};
use crate::agents::{HandlerKind, HandlerRegistry};

/// Phase of one routing turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Waiting on the router's decision
    Routing,
    /// The named handler is producing its message
    Handling(HandlerKind),
    /// Turn completed with a reply
    Done,
    /// Turn aborted with a typed error
    Failed,
}

/// Event driving the turn forward
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// The router decided
    Decided(Decision),
    /// The selected handler produced its message
    Handled,
}

/// Pure transition function. Invalid phase/event pairings are
/// configuration errors; the caller marks the turn `Failed` on any `Err`.
pub fn transition(
    phase: TurnPhase,
    event: &TurnEvent,
    registry: &HandlerRegistry,
) -> Result<TurnPhase, TurnError> {
    match (phase, event) {
        (TurnPhase::Routing, TurnEvent::Decided(Decision::Answer(_))) => Ok(TurnPhase::Done),
        (TurnPhase::Routing, TurnEvent::Decided(Decision::Dispatch(instruction))) => registry
            .resolve(&instruction.target)
            .map(TurnPhase::Handling)
            .ok_or_else(|| {
                RoutingError::UnknownHandler(instruction.target.clone()).into()
            }),
        (TurnPhase::Handling(_), TurnEvent::Handled) => Ok(TurnPhase::Done),
        (phase, event) => Err(TurnError::Configuration(format!(
            "invalid transition: {phase:?} on {event:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::MockGenerator;
    use crate::message::DispatchInstruction;
    use std::sync::Arc;

    fn registry() -> HandlerRegistry {
        HandlerRegistry::new(Arc::new(MockGenerator::new()))
    }

    #[test]
    fn plain_answer_terminates_without_a_handler() {
        let next = transition(
            TurnPhase::Routing,
            &TurnEvent::Decided(Decision::Answer("Hi there!".to_string())),
            &registry(),
        )
        .unwrap();
        assert_eq!(next, TurnPhase::Done);
    }

    #[test]
    fn registered_dispatch_enters_handling() {
        let next = transition(
            TurnPhase::Routing,
            &TurnEvent::Decided(Decision::Dispatch(DispatchInstruction::new(
                "content_generation",
            ))),
            &registry(),
        )
        .unwrap();
        assert_eq!(next, TurnPhase::Handling(HandlerKind::ContentGeneration));
    }

    #[test]
    fn unknown_handler_is_a_routing_error() {
        let err = transition(
            TurnPhase::Routing,
            &TurnEvent::Decided(Decision::Dispatch(DispatchInstruction::new("planner"))),
            &registry(),
        )
        .unwrap_err();
        match err {
            TurnError::Routing(RoutingError::UnknownHandler(name)) => {
                assert_eq!(name, "planner");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn handling_terminates_after_one_hop() {
        let next = transition(
            TurnPhase::Handling(HandlerKind::Conversational),
            &TurnEvent::Handled,
            &registry(),
        )
        .unwrap();
        assert_eq!(next, TurnPhase::Done);
    }

    #[test]
    fn terminal_phases_accept_no_events() {
        for phase in [TurnPhase::Done, TurnPhase::Failed] {
            let err = transition(phase, &TurnEvent::Handled, &registry()).unwrap_err();
            assert!(matches!(err, TurnError::Configuration(_)));
        }
    }
}
