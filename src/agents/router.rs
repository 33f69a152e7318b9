//! Router handler
//!
//! Classifies the latest user message against the registered handlers
//! and emits either a dispatch instruction or a direct answer.

use super::HandlerRegistry;
use crate::graph::{Classifier, ClassifyError, Decision, RoutingError, TurnError};
use crate::message::Message;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "Du bist ein intelligenter Router, der Benutzeranfragen an den am \
    besten geeigneten Agenten weiterleitet. Du rufst IMMER eine der bereitgestellten Funktionen \
    auf. Leite die Anfrage des Benutzers unverändert weiter.";

pub struct Router {
    classifier: Arc<dyn Classifier>,
}

impl Router {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub async fn route(
        &self,
        history: &[Message],
        registry: &HandlerRegistry,
    ) -> Result<Decision, TurnError> {
        if registry.is_empty() {
            return Err(TurnError::Configuration(
                "no handlers registered".to_string(),
            ));
        }

        self.classifier
            .classify(SYSTEM_PROMPT, history, &registry.definitions())
            .await
            .map_err(|err| match err {
                ClassifyError::Upstream(e) => TurnError::Generation(e),
                ClassifyError::Ambiguous => {
                    TurnError::Routing(RoutingError::AmbiguousDecision)
                }
                ClassifyError::Empty => {
                    TurnError::Configuration("classifier produced no output".to_string())
                }
            })
    }
}
