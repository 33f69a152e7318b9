//! LLM provider abstraction
//!
//! A single trait boundary over the text-generation backend. The rest of
//! the crate only sees `LlmService`; the concrete Gemini client lives
//! behind it.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Configuration for the LLM backend
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Model name sent to the API (e.g. `gemini-2.5-flash-lite`)
    pub model: Option<String>,
    /// Optional gateway base URL overriding the public Gemini endpoint
    pub gateway: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: std::env::var("GEMINI_MODEL").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
        }
    }

    /// Build the configured service, or `None` when no API key is set
    pub fn build_service(&self) -> Option<Arc<dyn LlmService>> {
        let api_key = self.gemini_api_key.clone().filter(|k| !k.is_empty())?;
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| GeminiService::DEFAULT_MODEL.to_string());
        let service = GeminiService::new(api_key, model, self.gateway.as_deref());
        Some(Arc::new(LoggingService::new(Arc::new(service))))
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    function_calls = response.function_calls().len(),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
