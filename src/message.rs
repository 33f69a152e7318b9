//! Chat message envelope
//!
//! Messages are immutable values: constructed once, appended to the
//! conversation log, never mutated in place. Structured side-channel data
//! (a pending dispatch, a render hint) is carried as closed sum types
//! rather than an open key/value bag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// The router's directive naming which handler runs next.
///
/// Produced only by the router; consumed only by the dispatch graph.
/// Never persisted beyond one routing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchInstruction {
    /// Registered handler name (e.g. `content_generation`)
    pub target: String,
    /// Free-form argument mapping supplied by the classifier
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

impl DispatchInstruction {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }
}

/// How the display layer should treat a secondary payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    Html,
    Plain,
}

impl RenderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderKind::Html => "html",
            RenderKind::Plain => "plain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "html" => Some(RenderKind::Html),
            "plain" => Some(RenderKind::Plain),
            _ => None,
        }
    }
}

/// Secondary structured artifact attached to a message for the display sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHint {
    pub kind: RenderKind,
    pub payload: String,
}

impl RenderHint {
    pub fn html(payload: impl Into<String>) -> Self {
        Self {
            kind: RenderKind::Html,
            payload: payload.into(),
        }
    }

    #[allow(dead_code)] // Constructor for API completeness
    pub fn plain(payload: impl Into<String>) -> Self {
        Self {
            kind: RenderKind::Plain,
            payload: payload.into(),
        }
    }
}

/// A single chat utterance with optional structured side channels.
///
/// Empty text is permitted (a dispatch-only router message is the
/// degenerate case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchInstruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_hint: Option<RenderHint>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            dispatch: None,
            render_hint: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            dispatch: None,
            render_hint: None,
        }
    }

    /// Router output carrying a dispatch instruction
    pub fn assistant_dispatch(text: impl Into<String>, dispatch: DispatchInstruction) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            dispatch: Some(dispatch),
            render_hint: None,
        }
    }

    /// Handler output carrying a secondary render artifact
    pub fn assistant_with_hint(text: impl Into<String>, hint: RenderHint) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            dispatch: None,
            render_hint: Some(hint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_has_no_side_channels() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text, "Hello");
        assert!(msg.dispatch.is_none());
        assert!(msg.render_hint.is_none());
    }

    #[test]
    fn test_dispatch_arguments_lookup() {
        let dispatch =
            DispatchInstruction::new("content_generation").with_argument("topic", "sales");
        assert_eq!(dispatch.argument("topic"), Some("sales"));
        assert_eq!(dispatch.argument("missing"), None);
    }

    #[test]
    fn test_empty_text_is_permitted() {
        let msg = Message::assistant_dispatch("", DispatchInstruction::new("conversation"));
        assert!(msg.text.is_empty());
        assert!(msg.dispatch.is_some());
    }

    #[test]
    fn test_serde_omits_absent_side_channels() {
        let json = serde_json::to_value(&Message::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("dispatch").is_none());
        assert!(json.get("render_hint").is_none());
    }

    #[test]
    fn test_render_hint_kind_serializes_snake_case() {
        let msg = Message::assistant_with_hint("caption", RenderHint::html("<p>x</p>"));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["render_hint"]["kind"], "html");
        assert_eq!(json["render_hint"]["payload"], "<p>x</p>");
    }
}
