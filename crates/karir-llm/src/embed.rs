//! Text embeddings through Ollama's `/api/embed`

use crate::provider::{LlmError, LlmResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Turns texts into vectors, one per input, in input order.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;

    async fn embed(&self, inputs: &[String]) -> LlmResult<Vec<Vec<f32>>>;
}

pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn embed_url(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[async_trait::async_trait]
impl Embedder for OllamaEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} input(s) with {}", inputs.len(), self.model);

        let body = EmbedRequest { model: &self.model, input: inputs };
        let response = self.client.post(self.embed_url()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Ollama embed error {}: {}", status, error_text);
            if status.as_u16() == 404 {
                return Err(LlmError::ModelNotFound(format!("{}: {}", self.model, error_text)));
            }
            return Err(LlmError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        if parsed.embeddings.len() != inputs.len() {
            return Err(LlmError::InvalidResponse(format!(
                "{} embeddings for {} inputs",
                parsed.embeddings.len(),
                inputs.len()
            )));
        }
        Ok(parsed.embeddings)
    }
}
