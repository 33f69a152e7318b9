//! Turn driver
//!
//! Single pass per user turn: exactly one router invocation, at most one
//! handler invocation, then termination. The graph receives a transient
//! slice of the conversation and returns the reply; appending to the log
//! is the caller's job, so a failed turn leaves the log untouched.

use super::transition::{transition, TurnEvent, TurnPhase};
use super::traits::{Classifier, Decision, Generator, LlmClassifier, LlmGenerator};
use super::TurnError;
use crate::agents::{HandlerRegistry, Router};
use crate::llm::LlmService;
use crate::message::{DispatchInstruction, Message};
use std::sync::Arc;

/// Result of one completed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The single assistant message to append
    pub reply: Message,
    /// Routing metadata for the display layer, never persisted
    pub dispatch: Option<DispatchInstruction>,
}

/// Wires router, registry, and handlers for one turn at a time
pub struct DispatchGraph {
    router: Router,
    registry: HandlerRegistry,
}

impl DispatchGraph {
    pub fn new(classifier: Arc<dyn Classifier>, generator: Arc<dyn Generator>) -> Self {
        Self {
            router: Router::new(classifier),
            registry: HandlerRegistry::new(generator),
        }
    }

    /// Production wiring over the configured LLM service
    pub fn from_service(service: Arc<dyn LlmService>) -> Self {
        Self::new(
            Arc::new(LlmClassifier::new(service.clone())),
            Arc::new(LlmGenerator::new(service)),
        )
    }

    #[cfg(test)]
    pub fn with_registry(classifier: Arc<dyn Classifier>, registry: HandlerRegistry) -> Self {
        Self {
            router: Router::new(classifier),
            registry,
        }
    }

    /// Run one turn over the given history slice.
    ///
    /// The history must end with the user message for this turn. On
    /// success exactly one reply is returned; on error nothing is.
    pub async fn run_turn(&self, history: &[Message]) -> Result<TurnOutcome, TurnError> {
        let phase = TurnPhase::Routing;

        let decision = match self.router.route(history, &self.registry).await {
            Ok(decision) => decision,
            Err(err) => return Err(fail(phase, err)),
        };

        let phase = match transition(phase, &TurnEvent::Decided(decision.clone()), &self.registry)
        {
            Ok(next) => next,
            Err(err) => return Err(fail(phase, err)),
        };

        match (phase, decision) {
            (TurnPhase::Done, Decision::Answer(text)) => {
                tracing::debug!("router answered directly");
                Ok(TurnOutcome {
                    reply: Message::assistant(text),
                    dispatch: None,
                })
            }
            (TurnPhase::Handling(kind), Decision::Dispatch(instruction)) => {
                tracing::debug!(handler = kind.name(), "dispatching to handler");

                // The instruction rides on a transient routed message so
                // handlers can read their arguments from the tail.
                let mut turn_messages = history.to_vec();
                turn_messages.push(Message::assistant_dispatch("", instruction.clone()));

                let reply = match self.registry.handle(kind, &turn_messages).await {
                    Ok(reply) => reply,
                    Err(err) => return Err(fail(phase, err)),
                };

                transition(phase, &TurnEvent::Handled, &self.registry)
                    .map_err(|err| fail(phase, err))?;

                Ok(TurnOutcome {
                    reply,
                    dispatch: Some(instruction),
                })
            }
            (phase, decision) => Err(fail(
                phase,
                TurnError::Configuration(format!(
                    "phase {phase:?} does not match decision {decision:?}"
                )),
            )),
        }
    }
}

fn fail(phase: TurnPhase, err: TurnError) -> TurnError {
    tracing::warn!(?phase, error = %err, "turn failed");
    err
}
