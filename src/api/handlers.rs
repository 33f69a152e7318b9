//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, SessionListResponse, SessionResponse,
    SessionWithMessagesResponse, SuccessResponse,
};
use super::AppState;
use crate::graph::TurnError;
use crate::message::Message;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use chrono::{Local, Timelike};
use rand::seq::SliceRandom;
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_index))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Session listing
        .route("/api/sessions", get(list_sessions))
        // Session creation
        .route("/api/sessions/new", post(create_session))
        // Session retrieval with message log
        .route("/api/sessions/:id", get(get_session))
        // One chat turn
        .route("/api/sessions/:id/chat", post(send_chat))
        // Lifecycle
        .route("/api/sessions/:id/delete", post(delete_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Index
// ============================================================

async fn serve_index() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Listing
// ============================================================

async fn list_sessions(State(state): State<AppState>) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = state
        .db
        .list_sessions()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let json_sessions: Vec<Value> = sessions
        .into_iter()
        .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
        .collect();

    Ok(Json(SessionListResponse {
        sessions: json_sessions,
    }))
}

// ============================================================
// Session Creation
// ============================================================

async fn create_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let slug = generate_slug();

    let session = state
        .db
        .create_session(&id, &slug)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(SessionResponse {
        session: serde_json::to_value(session).unwrap_or(Value::Null),
    }))
}

// ============================================================
// Session Retrieval
// ============================================================

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionWithMessagesResponse>, AppError> {
    let session = state
        .db
        .get_session(&id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let messages = state
        .db
        .history(&id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let json_messages: Vec<Value> = messages
        .iter()
        .map(|m| serde_json::to_value(m).unwrap_or(Value::Null))
        .collect();

    Ok(Json(SessionWithMessagesResponse {
        session: serde_json::to_value(session).unwrap_or(Value::Null),
        messages: json_messages,
    }))
}

// ============================================================
// Chat Turn
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message text is empty".to_string()));
    }

    state
        .db
        .get_session(&id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let Some(graph) = state.graph.clone() else {
        return Err(AppError::Unavailable(
            "No LLM backend configured (set GEMINI_API_KEY)".to_string(),
        ));
    };

    // One turn at a time per session.
    let Some(_claim) = state.claim_session(&id) else {
        return Err(AppError::Conflict(
            "A turn is already running for this session".to_string(),
        ));
    };

    // The user message is committed before the turn runs; a failed turn
    // leaves the log with the user message and nothing else.
    let user_message = Message::user(req.text);
    state
        .db
        .append_message(&uuid::Uuid::new_v4().to_string(), &id, &user_message)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let history: Vec<Message> = state
        .db
        .history(&id)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_iter()
        .map(|stored| stored.message)
        .collect();

    let outcome = graph.run_turn(&history).await.map_err(AppError::Turn)?;

    let stored = state
        .db
        .append_message(&uuid::Uuid::new_v4().to_string(), &id, &outcome.reply)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ChatResponse {
        message: serde_json::to_value(stored).unwrap_or(Value::Null),
        dispatch: outcome.dispatch,
    }))
}

// ============================================================
// Lifecycle
// ============================================================

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .db
        .delete_session(&id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("switchboard ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Slug Generation
// ============================================================

fn generate_slug() -> String {
    let now = Local::now();

    let day = match now.weekday() {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    };

    let time = match now.hour() {
        6..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    };

    let words = &[
        "amber", "birch", "cedar", "delta", "ember", "fjord", "grove", "harbor", "indigo",
        "juniper", "krypton", "lagoon", "meadow", "nimbus", "onyx", "prism", "quartz", "ripple",
        "summit", "thicket", "umbra", "violet", "willow", "zephyr",
    ];

    let mut rng = rand::thread_rng();
    let adjective = words.choose(&mut rng).unwrap_or(&"blue");
    let noun = words.choose(&mut rng).unwrap_or(&"sky");

    format!("{day}-{time}-{adjective}-{noun}")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
    Turn(TurnError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new(msg)),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::new(msg))
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
            AppError::Turn(err) => {
                let stage = match &err {
                    TurnError::Routing(_) => "routing",
                    TurnError::Generation(_) => "generation",
                    TurnError::Configuration(_) => "configuration",
                };
                let status = match &err {
                    TurnError::Generation(_) => StatusCode::BAD_GATEWAY,
                    TurnError::Routing(_) | TurnError::Configuration(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, ErrorResponse::new(err.to_string()).with_stage(stage))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::graph::testing::{MockClassifier, MockGenerator};
    use crate::graph::{ClassifyError, Decision, DispatchGraph, GenerationError};
    use crate::llm::LlmError;
    use crate::message::{DispatchInstruction, RenderKind, Role};
    use std::sync::Arc;

    fn state_with(classifier: MockClassifier) -> AppState {
        let db = Database::open_in_memory().unwrap();
        let graph = DispatchGraph::new(Arc::new(classifier), Arc::new(MockGenerator::new()));
        AppState::new(db, Some(Arc::new(graph)))
    }

    fn new_session(state: &AppState) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        state.db.create_session(&id, "test-session").unwrap();
        id
    }

    #[tokio::test]
    async fn plain_answer_turn_leaves_two_messages() {
        let classifier = MockClassifier::new();
        classifier.queue(Ok(Decision::Answer("Hi there!".to_string())));
        let state = state_with(classifier);
        let id = new_session(&state);

        let response = send_chat(
            State(state.clone()),
            Path(id.clone()),
            Json(ChatRequest {
                text: "Hello".to_string(),
            }),
        )
        .await
        .expect("chat turn failed");

        assert!(response.0.dispatch.is_none());
        let history = state.db.history(&id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message.role, Role::User);
        assert_eq!(history[1].message.text, "Hi there!");
        assert!(history[1].message.render_hint.is_none());
    }

    #[tokio::test]
    async fn table_turn_persists_html_reply_and_reports_dispatch() {
        let classifier = MockClassifier::new();
        classifier.queue(Ok(Decision::Dispatch(
            DispatchInstruction::new("content_generation").with_argument("topic", "sales"),
        )));
        let state = state_with(classifier);
        let id = new_session(&state);

        let response = send_chat(
            State(state.clone()),
            Path(id.clone()),
            Json(ChatRequest {
                text: "Give me an HTML table about sales".to_string(),
            }),
        )
        .await
        .expect("chat turn failed");

        assert_eq!(
            response.0.dispatch.as_ref().map(|d| d.target.as_str()),
            Some("content_generation")
        );
        let history = state.db.history(&id).unwrap();
        assert_eq!(history.len(), 2);
        let hint = history[1].message.render_hint.as_ref().unwrap();
        assert_eq!(hint.kind, RenderKind::Html);
        assert!(hint.payload.contains("sales"));
    }

    #[tokio::test]
    async fn failed_turn_leaves_only_the_user_message() {
        let classifier = MockClassifier::new();
        classifier.queue(Err(ClassifyError::Upstream(GenerationError(
            LlmError::network("timeout"),
        ))));
        let state = state_with(classifier);
        let id = new_session(&state);

        let result = send_chat(
            State(state.clone()),
            Path(id.clone()),
            Json(ChatRequest {
                text: "Hello".to_string(),
            }),
        )
        .await;
        assert!(result.is_err());

        let history = state.db.history(&id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message.role, Role::User);
    }

    #[tokio::test]
    async fn chat_without_llm_backend_is_rejected() {
        let state = AppState::new(Database::open_in_memory().unwrap(), None);
        let id = new_session(&state);

        let result = send_chat(
            State(state.clone()),
            Path(id.clone()),
            Json(ChatRequest {
                text: "Hello".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));

        let history = state.db.history(&id).unwrap();
        assert!(history.is_empty());
    }
}
