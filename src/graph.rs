//! Dispatch graph for a single chat turn
//!
//! A two-level state machine: one router decision, at most one handler
//! invocation, then termination. The graph never loops back to routing
//! and never touches the session store; callers own the conversation log.

pub mod traits;
pub(crate) mod transition;
mod turn;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod proptests;

pub use traits::{Classifier, ClassifyError, Decision, Generator, LlmClassifier, LlmGenerator};
pub use transition::{transition, TurnEvent, TurnPhase};
pub use turn::{DispatchGraph, TurnOutcome};

use crate::llm::LlmError;
use thiserror::Error;

/// Typed failure for one chat turn, distinguishing which stage failed
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("routing failed: {0}")]
    Routing(#[from] RoutingError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// The router produced a decision the graph cannot act on
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("router named unregistered handler '{0}'")]
    UnknownHandler(String),
    #[error("router returned both an answer and a dispatch instruction")]
    AmbiguousDecision,
}

/// The text-generation collaborator failed
#[derive(Debug, Error)]
#[error("{0}")]
pub struct GenerationError(#[from] pub LlmError);
