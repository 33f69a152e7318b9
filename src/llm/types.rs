//! Common types for LLM interactions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub functions: Vec<FunctionDefinition>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(system: impl Into<String>, messages: Vec<LlmMessage>) -> Self {
        Self {
            system: Some(system.into()),
            messages,
            functions: Vec::new(),
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_functions(mut self, functions: Vec<FunctionDefinition>) -> Self {
        self.functions = functions;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Message in conversation
#[derive(Debug, Clone)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    FunctionCall {
        name: String,
        arguments: BTreeMap<String, String>,
    },
}

impl ContentBlock {
    pub fn text(s: impl Into<String>) -> Self {
        ContentBlock::Text { text: s.into() }
    }

    pub fn function_call(name: impl Into<String>, arguments: BTreeMap<String, String>) -> Self {
        ContentBlock::FunctionCall {
            name: name.into(),
            arguments,
        }
    }
}

/// Callable function exposed to the model
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
}

impl LlmResponse {
    /// Extract all function call requests from the response
    pub fn function_calls(&self) -> Vec<(&str, &BTreeMap<String, String>)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::FunctionCall { name, arguments } => {
                    Some((name.as_str(), arguments))
                }
                ContentBlock::Text { .. } => None,
            })
            .collect()
    }

    /// Get text content from the response
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::FunctionCall { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Check if response contains any function call requests
    pub fn has_function_call(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::FunctionCall { .. }))
    }
}
