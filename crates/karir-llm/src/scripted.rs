//! ScriptedProvider - deterministic LLM responses for tests and offline runs
//!
//! Replies are consumed in order; once the script runs out, an optional
//! responder closure decides the reply from the request, otherwise a fixed
//! fallback text is returned.

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::types::{LlmRequest, StreamDelta};
use async_stream::stream;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One canned reply
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    /// Text-only response
    Text(String),
    /// A single tool call
    ToolCall { name: String, args: Value },
    /// Text followed by a tool call
    TextThenTool { text: String, tool_name: String, tool_args: Value },
    /// Request-level failure
    Error(String),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn tool(name: impl Into<String>, args: Value) -> Self {
        Self::ToolCall { name: name.into(), args }
    }
}

type Responder = Arc<dyn Fn(&LlmRequest) -> ScriptedReply + Send + Sync>;

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<LlmRequest>>,
    models: Vec<String>,
}

impl ScriptedProvider {
    /// Replies consumed in order
    pub fn sequence(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            responder: None,
            requests: Mutex::new(Vec::new()),
            models: Vec::new(),
        }
    }

    /// Every call answered with the same reply
    pub fn constant(reply: ScriptedReply) -> Self {
        Self::responder(move |_| reply.clone())
    }

    /// Reply computed from each request
    pub fn responder<F>(f: F) -> Self
    where
        F: Fn(&LlmRequest) -> ScriptedReply + Send + Sync + 'static,
    {
        Self {
            replies: Mutex::new(VecDeque::new()),
            responder: Some(Arc::new(f)),
            requests: Mutex::new(Vec::new()),
            models: Vec::new(),
        }
    }

    /// Number of completions requested so far
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Every request received, oldest first
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self, request: &LlmRequest) -> ScriptedReply {
        self.requests.lock().await.push(request.clone());
        if let Some(reply) = self.replies.lock().await.pop_front() {
            return reply;
        }
        match &self.responder {
            Some(f) => f(request),
            None => ScriptedReply::Text("(script exhausted)".into()),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str { "scripted" }

    fn models(&self) -> &[String] {
        &self.models
    }

    fn supports_model(&self, _model: &str) -> bool {
        true
    }

    async fn complete_stream(
        &self,
        request: LlmRequest,
        cancel: Option<CancellationToken>,
    ) -> LlmResult<LlmStream> {
        if cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(LlmError::Cancelled);
        }
        let reply = self.next_reply(&request).await;

        if let ScriptedReply::Error(message) = reply {
            return Err(LlmError::RequestFailed(message));
        }

        Ok(Box::pin(stream! {
            let (text, tool) = match reply {
                ScriptedReply::Text(text) => (Some(text), None),
                ScriptedReply::ToolCall { name, args } => (None, Some((name, args))),
                ScriptedReply::TextThenTool { text, tool_name, tool_args } => {
                    (Some(text), Some((tool_name, tool_args)))
                }
                ScriptedReply::Error(_) => (None, None),
            };

            if let Some(text) = text {
                // Stream text in chunks like a real LLM
                let chars: Vec<char> = text.chars().collect();
                for chunk in chars.chunks(20) {
                    yield Ok(StreamDelta::Text(chunk.iter().collect()));
                }
            }

            let stop_reason = match tool {
                Some((name, args)) => {
                    let id = format!("call_{}", uuid::Uuid::new_v4().simple());
                    yield Ok(StreamDelta::ToolCallStart { id: id.clone(), name });
                    yield Ok(StreamDelta::ToolCallDelta {
                        id: id.clone(),
                        arguments: serde_json::to_string(&args).unwrap_or_default(),
                    });
                    yield Ok(StreamDelta::ToolCallEnd { id });
                    "tool_calls"
                }
                None => "stop",
            };
            yield Ok(StreamDelta::Done { stop_reason: Some(stop_reason.into()), usage: None });
        }))
    }
}
