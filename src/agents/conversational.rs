//! Passthrough conversational handler

use crate::graph::{Generator, TurnError};
use crate::message::Message;
use std::sync::Arc;

const SYSTEM_PROMPT: &str =
    "Du bist ein hilfreicher KI-Assistent. Antworte dem Benutzer freundlich und informativ.";

/// Delegates the whole message sequence to the text-generation
/// collaborator and wraps the reply. No dispatch, no render hint.
pub struct ConversationalAgent {
    generator: Arc<dyn Generator>,
}

impl ConversationalAgent {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn handle(&self, history: &[Message]) -> Result<Message, TurnError> {
        let text = self.generator.generate(SYSTEM_PROMPT, history).await?;
        Ok(Message::assistant(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::MockGenerator;
    use crate::graph::GenerationError;
    use crate::llm::LlmError;
    use crate::message::Role;

    #[tokio::test]
    async fn wraps_generated_text_as_plain_assistant_message() {
        let generator = MockGenerator::new();
        generator.queue(Ok("Gerne helfe ich weiter.".to_string()));
        let agent = ConversationalAgent::new(Arc::new(generator));

        let reply = agent.handle(&[Message::user("Hilfe bitte")]).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.text, "Gerne helfe ich weiter.");
        assert!(reply.dispatch.is_none());
        assert!(reply.render_hint.is_none());
    }

    #[tokio::test]
    async fn propagates_generation_failure() {
        let generator = MockGenerator::new();
        generator.queue(Err(GenerationError(LlmError::network("timeout"))));
        let agent = ConversationalAgent::new(Arc::new(generator));

        let err = agent.handle(&[Message::user("Hilfe")]).await.unwrap_err();
        assert!(matches!(err, TurnError::Generation(_)));
    }
}
