//! HTTP API
//!
//! Session CRUD plus the chat endpoint driving one dispatch-graph turn
//! per request. A session accepts one turn at a time; overlapping chat
//! requests for the same session are rejected.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::graph::DispatchGraph;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// None when no API key is configured; chat requests then fail with
    /// a configuration error while the rest of the API stays up.
    pub graph: Option<Arc<DispatchGraph>>,
    busy: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new(db: Database, graph: Option<Arc<DispatchGraph>>) -> Self {
        Self {
            db,
            graph,
            busy: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim a session for one turn. Returns a guard releasing the
    /// claim on drop, or `None` if a turn is already running.
    pub fn claim_session(&self, session_id: &str) -> Option<SessionClaim> {
        let mut busy = self.busy.lock().unwrap();
        if !busy.insert(session_id.to_string()) {
            return None;
        }
        Some(SessionClaim {
            busy: self.busy.clone(),
            session_id: session_id.to_string(),
        })
    }
}

/// Exclusive claim on a session for the duration of one turn
pub struct SessionClaim {
    busy: Arc<Mutex<HashSet<String>>>,
    session_id: String,
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        self.busy.lock().unwrap().remove(&self.session_id);
    }
}
