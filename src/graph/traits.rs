//! Collaborator traits at the graph's seams
//!
//! The graph talks to the language model through two narrow interfaces:
//! a `Generator` for free-form text and a `Classifier` for routing
//! decisions. Production adapters wrap an `LlmService`; tests queue
//! canned decisions instead.

use super::GenerationError;
use crate::llm::{FunctionDefinition, LlmMessage, LlmRequest, LlmService};
use crate::message::{DispatchInstruction, Message, Role};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Sampling temperature carried over for both collaborator calls
const TEMPERATURE: f32 = 0.8;

/// Outcome of one classification call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Direct answer, no handler runs this turn
    Answer(String),
    /// Route to the named handler with its argument mapping
    Dispatch(DispatchInstruction),
}

/// Classification failures before any handler is chosen
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Upstream(#[from] GenerationError),
    #[error("classifier returned both an answer and a dispatch instruction")]
    Ambiguous,
    #[error("classifier produced no output")]
    Empty,
}

/// Free-form text generation over a message sequence
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system: &str, history: &[Message])
        -> Result<String, GenerationError>;
}

/// Routing decision over a message sequence and the registered handlers
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        system: &str,
        history: &[Message],
        handlers: &[FunctionDefinition],
    ) -> Result<Decision, ClassifyError>;
}

// Gemini rejects empty text parts, so text-less messages (the routed
// dispatch placeholder) stay out of the request.
fn to_llm_messages(history: &[Message]) -> Vec<LlmMessage> {
    history
        .iter()
        .filter(|msg| !msg.text.is_empty())
        .map(|msg| match msg.role {
            Role::User => LlmMessage::user(msg.text.clone()),
            Role::Assistant => LlmMessage::assistant(msg.text.clone()),
        })
        .collect()
}

/// `Generator` backed by the configured LLM service
pub struct LlmGenerator {
    service: Arc<dyn LlmService>,
}

impl LlmGenerator {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(
        &self,
        system: &str,
        history: &[Message],
    ) -> Result<String, GenerationError> {
        let request =
            LlmRequest::new(system, to_llm_messages(history)).with_temperature(TEMPERATURE);
        let response = self.service.complete(&request).await?;
        Ok(response.text())
    }
}

/// `Classifier` backed by the configured LLM service via function calling
pub struct LlmClassifier {
    service: Arc<dyn LlmService>,
}

impl LlmClassifier {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(
        &self,
        system: &str,
        history: &[Message],
        handlers: &[FunctionDefinition],
    ) -> Result<Decision, ClassifyError> {
        let request = LlmRequest::new(system, to_llm_messages(history))
            .with_functions(handlers.to_vec())
            .with_temperature(TEMPERATURE);
        let response = self
            .service
            .complete(&request)
            .await
            .map_err(GenerationError)?;

        let calls = response.function_calls();
        let text = response.text();
        match calls.as_slice() {
            [] if text.trim().is_empty() => Err(ClassifyError::Empty),
            [] => Ok(Decision::Answer(text)),
            [(name, arguments)] if text.trim().is_empty() => {
                let mut instruction = DispatchInstruction::new(*name);
                for (key, value) in arguments.iter() {
                    instruction = instruction.with_argument(key.clone(), value.clone());
                }
                Ok(Decision::Dispatch(instruction))
            }
            _ => Err(ClassifyError::Ambiguous),
        }
    }
}
