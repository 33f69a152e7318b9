//! API request and response types

use crate::message::DispatchInstruction;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response with a list of sessions
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<serde_json::Value>,
}

/// Response with a single session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: serde_json::Value,
}

/// Response with session and message log
#[derive(Debug, Serialize)]
pub struct SessionWithMessagesResponse {
    pub session: serde_json::Value,
    pub messages: Vec<serde_json::Value>,
}

/// Response for a completed chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The persisted assistant reply
    pub message: serde_json::Value,
    /// Routing metadata for the "next action" display, if a handler ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchInstruction>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Which stage of the turn failed, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            stage: None,
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}
