//! Switchboard - LLM-routed demo chat server
//!
//! Routes each user message through a router decision to either a
//! conversational handler or a fixed HTML-table generator, and serves
//! a small chat UI on top of a session log.

mod agents;
mod api;
mod db;
mod graph;
mod llm;
mod message;

use api::{create_router, AppState};
use db::Database;
use graph::DispatchGraph;
use llm::LlmConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("SWITCHBOARD_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.switchboard/switchboard.db")
    });

    let port: u16 = std::env::var("SWITCHBOARD_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    // Wire the dispatch graph if an LLM backend is configured
    let llm_config = LlmConfig::from_env();
    let graph = match llm_config.build_service() {
        Some(service) => {
            tracing::info!(model = %service.model_id(), "LLM backend initialized");
            Some(Arc::new(DispatchGraph::from_service(service)))
        }
        None => {
            tracing::warn!("No LLM API key configured. Set GEMINI_API_KEY.");
            None
        }
    };

    let state = AppState::new(db, graph);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state).layer(cors).layer(compression);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Switchboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
