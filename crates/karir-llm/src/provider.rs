//! LLM Provider trait

use crate::types::{LlmRequest, StreamDelta};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// LLM error types
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Stream type for LLM responses
pub type LlmStream = Pin<Box<dyn Stream<Item = LlmResult<StreamDelta>> + Send>>;

/// LLM Provider trait
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;
    fn models(&self) -> &[String];

    fn supports_model(&self, model: &str) -> bool {
        self.models()
            .iter()
            .any(|m| m == model || model.starts_with(m.as_str()))
    }

    /// Stream a completion response. If `cancel` is provided and triggered,
    /// the underlying HTTP connection is dropped and the stream yields `LlmError::Cancelled`.
    async fn complete_stream(
        &self,
        request: LlmRequest,
        cancel: Option<CancellationToken>,
    ) -> LlmResult<LlmStream>;

    /// Run a request to completion and return the concatenated text.
    async fn complete(&self, request: LlmRequest) -> LlmResult<String> {
        collect_text(self, request).await
    }
}

/// Drain a completion stream into its text. Tool calls are ignored; an
/// in-stream error fails the whole call.
pub async fn collect_text<P: LlmProvider + ?Sized>(provider: &P, request: LlmRequest) -> LlmResult<String> {
    let mut stream = provider.complete_stream(request, None).await?;
    let mut text = String::new();
    while let Some(delta) = stream.next().await {
        match delta? {
            StreamDelta::Text(t) => text.push_str(&t),
            StreamDelta::Error(e) => return Err(LlmError::StreamError(e)),
            StreamDelta::Done { .. } => break,
            _ => {}
        }
    }
    Ok(text)
}
