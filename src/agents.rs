//! Agent handlers and the static handler registry
//!
//! Handlers are a closed set of variants sharing one contract: consume
//! the message sequence for the turn, produce exactly one new message.
//! Selection is by tagged dispatch over `HandlerKind`, never a free-form
//! string-to-callable table.

mod conversational;
mod router;
mod table_demo;

pub use conversational::ConversationalAgent;
pub use router::Router;
pub use table_demo::TableDemoAgent;

use crate::graph::{Generator, TurnError};
use crate::llm::FunctionDefinition;
use crate::message::Message;
use std::sync::Arc;

/// The enumerated handler variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Conversational,
    ContentGeneration,
}

impl HandlerKind {
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Conversational => "conversation",
            HandlerKind::ContentGeneration => "content_generation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "conversation" => Some(HandlerKind::Conversational),
            "content_generation" => Some(HandlerKind::ContentGeneration),
            _ => None,
        }
    }
}

/// Static registry of the handlers available to the dispatch graph
pub struct HandlerRegistry {
    registered: Vec<HandlerKind>,
    conversational: ConversationalAgent,
    table_demo: TableDemoAgent,
}

impl HandlerRegistry {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            registered: vec![HandlerKind::Conversational, HandlerKind::ContentGeneration],
            conversational: ConversationalAgent::new(generator),
            table_demo: TableDemoAgent,
        }
    }

    /// Registry with no handlers enabled, for configuration-error paths
    #[cfg(test)]
    pub fn empty(generator: Arc<dyn Generator>) -> Self {
        Self {
            registered: Vec::new(),
            conversational: ConversationalAgent::new(generator),
            table_demo: TableDemoAgent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Resolve a dispatch target to a registered handler
    pub fn resolve(&self, name: &str) -> Option<HandlerKind> {
        HandlerKind::from_name(name).filter(|kind| self.registered.contains(kind))
    }

    /// Function declarations offered to the classifier
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.registered
            .iter()
            .map(|kind| match kind {
                HandlerKind::Conversational => FunctionDefinition::new(
                    kind.name(),
                    "Beantwortet allgemeine Fragen und führt ein freundliches Gespräch.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "Die unveränderte Anfrage des Benutzers."
                            }
                        },
                        "required": ["query"]
                    }),
                ),
                HandlerKind::ContentGeneration => FunctionDefinition::new(
                    kind.name(),
                    "Erstellt eine HTML-Beispieltabelle zu einem Thema.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "topic": {
                                "type": "string",
                                "description": "Das Thema der Tabelle."
                            }
                        },
                        "required": ["topic"]
                    }),
                ),
            })
            .collect()
    }

    /// Run the selected handler over the turn's message sequence
    pub async fn handle(
        &self,
        kind: HandlerKind,
        history: &[Message],
    ) -> Result<Message, TurnError> {
        match kind {
            HandlerKind::Conversational => self.conversational.handle(history).await,
            HandlerKind::ContentGeneration => Ok(self.table_demo.handle(history)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::MockGenerator;

    #[test]
    fn names_round_trip() {
        for kind in [HandlerKind::Conversational, HandlerKind::ContentGeneration] {
            assert_eq!(HandlerKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(HandlerKind::from_name("html_demo_agent"), None);
    }

    #[test]
    fn registry_resolves_only_registered_handlers() {
        let registry = HandlerRegistry::new(Arc::new(MockGenerator::new()));
        assert_eq!(
            registry.resolve("conversation"),
            Some(HandlerKind::Conversational)
        );
        assert_eq!(
            registry.resolve("content_generation"),
            Some(HandlerKind::ContentGeneration)
        );
        assert_eq!(registry.resolve("planner"), None);

        let empty = HandlerRegistry::empty(Arc::new(MockGenerator::new()));
        assert!(empty.is_empty());
        assert_eq!(empty.resolve("conversation"), None);
    }

    #[test]
    fn definitions_match_registered_names() {
        let registry = HandlerRegistry::new(Arc::new(MockGenerator::new()));
        let names: Vec<_> = registry
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["conversation", "content_generation"]);
    }
}
