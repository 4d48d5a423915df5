//! Karir LLM - Provider adapters with streaming support, and text embeddings

pub mod embed;
pub mod ollama;
pub mod provider;
pub mod scripted;
pub mod types;

pub use embed::{Embedder, OllamaEmbedder};
pub use ollama::OllamaProvider;
pub use provider::{collect_text, LlmError, LlmProvider, LlmResult, LlmStream};
pub use scripted::{ScriptedProvider, ScriptedReply};
pub use tokio_util::sync::CancellationToken;
pub use types::*;
