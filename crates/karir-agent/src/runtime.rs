//! Agent runtime - the chat loop: stream a reply, run requested tools, repeat

use crate::session::{Session, SessionKey, SessionRegistry};
use futures::StreamExt;
use karir_docs::Retriever;
use karir_llm::{AccumulatedToolCall, ContentBlock, LlmProvider, LlmRequest, LlmTool, StreamDelta};
use karir_tools::{ToolRegistry, ToolResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shown to the user when a turn fails.
pub const UNABLE_TO_PROCESS: &str = "Unable to process your request. Please try again.";

const MAX_TOOL_RESULT_CHARS: usize = 50_000;

const CONTEXT_PROMPT: &str = "Ini adalah dokumen yang mungkin relevan terhadap konteks:\n\n{context}\n\n\
Instruksi: Gunakan riwayat obrolan sebelumnya, atau konteks di atas, untuk berinteraksi dan membantu pengguna.";

#[derive(Clone, Debug)]
pub enum AgentEvent {
    /// Reply text as it streams in.
    Text(String),
    ToolCallStart { id: String, name: String },
    ToolCallDelta { id: String, arguments: String },
    ToolExecuting { id: String, name: String },
    /// Content as stored in the session (possibly truncated).
    ToolResult { id: String, name: String, result: String, is_error: bool },
    Done { stop_reason: String },
    Error(String),
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub default_model: String,
    pub max_tool_iterations: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    /// Chat memory budget per session.
    pub memory_tokens: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_model: "llama3.1:8b-instruct-q4_0".to_string(),
            max_tool_iterations: 8,
            max_tokens: 2048,
            temperature: 0.0,
            system_prompt: None,
            memory_tokens: 32_768,
        }
    }
}

pub struct AgentRuntime {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    sessions: Arc<SessionRegistry>,
    retriever: Option<Arc<Retriever>>,
    config: AgentConfig,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            provider,
            tools: Arc::new(tools),
            sessions: Arc::new(SessionRegistry::new()),
            retriever: None,
            config,
        }
    }

    /// Add document chunks relevant to each user message to that turn's system prompt.
    pub fn with_retriever(mut self, retriever: Arc<Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn retriever(&self) -> Option<&Arc<Retriever>> {
        self.retriever.as_ref()
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }
    pub fn tool_definitions(&self) -> Vec<LlmTool> {
        self.tools.definitions()
    }
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Page prompt followed by the tools' own prompt fragments.
    pub fn system_prompt(&self) -> Option<String> {
        let fragments = self.tools.prompt_fragments();
        match (&self.config.system_prompt, fragments.is_empty()) {
            (Some(sys), true) => Some(sys.clone()),
            (Some(sys), false) => Some(format!("{}\n\n{}", sys, fragments)),
            (None, false) => Some(fragments),
            (None, true) => None,
        }
    }

    fn get_session(&self, session_key: &SessionKey) -> Arc<Session> {
        self.sessions.get_or_create(
            session_key,
            self.system_prompt().as_deref(),
            self.config.memory_tokens,
        )
    }

    pub async fn run_turn(
        &self,
        session_key: &SessionKey,
        user_message: &str,
        event_tx: mpsc::Sender<AgentEvent>,
    ) -> Result<(), String> {
        self.run_turn_cancellable(session_key, user_message, event_tx, CancellationToken::new()).await
    }

    /// Run a turn: stream a reply, run the tools it asks for and go again
    /// until the model answers in text. Cancelling stops the stream and any
    /// tools still queued; text already received is kept.
    pub async fn run_turn_cancellable(
        &self,
        session_key: &SessionKey,
        user_message: &str,
        event_tx: mpsc::Sender<AgentEvent>,
        cancel: CancellationToken,
    ) -> Result<(), String> {
        let session = self.get_session(session_key);
        let context = self.retrieve_context(&session, user_message).await;
        session.add_user_message(user_message).await;

        for round in 1..=self.config.max_tool_iterations + 1 {
            if cancel.is_cancelled() {
                debug!("Turn cancelled before round {}", round);
                return finish(&event_tx, "cancelled").await;
            }
            if round > self.config.max_tool_iterations {
                warn!("Session {} exceeded {} tool rounds", session_key, self.config.max_tool_iterations);
                let _ = event_tx.send(AgentEvent::Error("Max tool iterations exceeded".to_string())).await;
                break;
            }

            let request = self.build_request(&session, context.as_deref()).await;
            let reply = self.stream_reply(request, &cancel, &event_tx).await?;

            if reply.cancelled {
                if !reply.text.is_empty() {
                    session.add_assistant_text(&reply.text).await;
                }
                return finish(&event_tx, "cancelled").await;
            }

            if reply.tool_calls.is_empty() {
                if let Some(e) = reply.error.filter(|_| reply.text.is_empty()) {
                    return Err(e);
                }
                session.add_assistant_text(&reply.text).await;
                finish(&event_tx, &reply.stop_reason).await?;
                break;
            }

            let uses = reply
                .tool_calls
                .iter()
                .map(|tc| ContentBlock::ToolUse {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    input: tc.parse_arguments().unwrap_or_default(),
                })
                .collect();
            session.add_assistant_with_tools(Some(&reply.text), uses).await;

            if !self.run_tools(&session, reply.tool_calls, &cancel, &event_tx).await {
                return finish(&event_tx, "cancelled").await;
            }
        }

        info!(
            "Turn complete: session={}, messages={}, tokens~{}",
            session_key,
            session.message_count().await,
            session.token_count().await
        );
        Ok(())
    }

    /// Chunks for the new message, searched together with the previous
    /// reply so short answers still find the question they answer.
    async fn retrieve_context(&self, session: &Session, user_message: &str) -> Option<String> {
        let retriever = self.retriever.as_ref()?;
        let previous = session
            .get_messages()
            .await
            .iter()
            .rev()
            .find(|m| m.role == "assistant")
            .and_then(|m| m.content.text());
        let query = match previous {
            Some(reply) => format!("{}\n{}", reply, user_message),
            None => user_message.to_string(),
        };
        let context = retriever.context(&query).await;
        debug!("Retrieved context: {} chars", context.as_ref().map_or(0, |c| c.len()));
        context
    }

    async fn build_request(&self, session: &Session, context: Option<&str>) -> LlmRequest {
        let tools = self.tools.definitions();
        let context = context.map(|c| CONTEXT_PROMPT.replace("{context}", c));
        let system = match (session.system_prompt(), context) {
            (Some(sys), Some(ctx)) => Some(format!("{}\n\n{}", sys, ctx)),
            (sys, ctx) => ctx.or_else(|| sys.map(String::from)),
        };
        LlmRequest {
            model: self.config.default_model.clone(),
            messages: session.get_messages().await,
            tools: (!tools.is_empty()).then_some(tools),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            system,
        }
    }

    /// Forward one streamed completion as events while collecting it.
    async fn stream_reply(
        &self,
        request: LlmRequest,
        cancel: &CancellationToken,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<StreamedReply, String> {
        let stream = match self.provider.complete_stream(request, Some(cancel.clone())).await {
            Ok(s) => s,
            Err(e) => {
                let _ = event_tx.send(AgentEvent::Error(e.to_string())).await;
                return Err(e.to_string());
            }
        };
        tokio::pin!(stream);

        let mut reply = StreamedReply { stop_reason: "stop".to_string(), ..Default::default() };
        let mut pending: Option<AccumulatedToolCall> = None;

        loop {
            let delta = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Completion stream cancelled");
                    reply.cancelled = true;
                    break;
                }
                delta = stream.next() => delta,
            };
            let event = match delta {
                None => break,
                Some(Err(e)) => {
                    reply.error = Some(e.to_string());
                    AgentEvent::Error(e.to_string())
                }
                Some(Ok(StreamDelta::Text(text))) => {
                    reply.text.push_str(&text);
                    AgentEvent::Text(text)
                }
                Some(Ok(StreamDelta::ToolCallStart { id, name })) => {
                    pending = Some(AccumulatedToolCall { id: id.clone(), name: name.clone(), arguments: String::new() });
                    AgentEvent::ToolCallStart { id, name }
                }
                Some(Ok(StreamDelta::ToolCallDelta { id, arguments })) => {
                    if let Some(call) = pending.as_mut() {
                        call.arguments.push_str(&arguments);
                    }
                    AgentEvent::ToolCallDelta { id, arguments }
                }
                Some(Ok(StreamDelta::ToolCallEnd { .. })) => {
                    reply.tool_calls.extend(pending.take());
                    continue;
                }
                Some(Ok(StreamDelta::Done { stop_reason, .. })) => {
                    if let Some(reason) = stop_reason {
                        reply.stop_reason = reason;
                    }
                    continue;
                }
                Some(Ok(StreamDelta::Error(e))) => {
                    reply.error = Some(e.clone());
                    AgentEvent::Error(e)
                }
            };
            let _ = event_tx.send(event).await;
        }
        Ok(reply)
    }

    /// Execute calls in order, appending each result to the session.
    /// Returns false when cancelled part way.
    async fn run_tools(
        &self,
        session: &Session,
        calls: Vec<AccumulatedToolCall>,
        cancel: &CancellationToken,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> bool {
        for call in calls {
            if cancel.is_cancelled() {
                debug!("Skipping {} after cancellation", call.name);
                return false;
            }
            let _ = event_tx.send(AgentEvent::ToolExecuting { id: call.id.clone(), name: call.name.clone() }).await;

            let result = match call.parse_arguments() {
                Ok(args) => {
                    info!("Tool {} {}", call.name, args);
                    self.tools.execute_cancellable(&call.name, args, cancel.clone()).await
                }
                Err(e) => ToolResult::error(format!("Invalid arguments for {}: {}", call.name, e)),
            };
            let is_error = result.is_error();
            let content = truncate_result(result.to_content_string());

            session.add_tool_result(&call.id, &content, is_error).await;
            let _ = event_tx
                .send(AgentEvent::ToolResult { id: call.id, name: call.name, result: content, is_error })
                .await;
        }
        true
    }

    /// Run a turn and return the reply text, or the apology on failure.
    pub async fn respond(&self, session_key: &SessionKey, user_message: &str) -> String {
        let (tx, mut rx) = mpsc::channel::<AgentEvent>(256);
        let collector = tokio::spawn(async move {
            let mut reply = String::new();
            while let Some(event) = rx.recv().await {
                if let AgentEvent::Text(t) = event {
                    reply.push_str(&t);
                }
            }
            reply
        });

        let outcome = self.run_turn(session_key, user_message, tx).await;
        let reply = collector.await.unwrap_or_default();
        match outcome {
            Ok(()) if !reply.trim().is_empty() => reply,
            Ok(()) => UNABLE_TO_PROCESS.to_string(),
            Err(e) => {
                warn!("Turn failed for {}: {}", session_key, e);
                UNABLE_TO_PROCESS.to_string()
            }
        }
    }
}

#[derive(Default)]
struct StreamedReply {
    text: String,
    tool_calls: Vec<AccumulatedToolCall>,
    stop_reason: String,
    error: Option<String>,
    cancelled: bool,
}

async fn finish(event_tx: &mpsc::Sender<AgentEvent>, stop_reason: &str) -> Result<(), String> {
    let _ = event_tx.send(AgentEvent::Done { stop_reason: stop_reason.to_string() }).await;
    Ok(())
}

fn truncate_result(result: String) -> String {
    if result.len() <= MAX_TOOL_RESULT_CHARS {
        return result;
    }
    let mut cut = MAX_TOOL_RESULT_CHARS;
    while !result.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n[truncated, {} total chars]", &result[..cut], result.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(MAX_TOOL_RESULT_CHARS);
        let out = truncate_result(long);
        assert!(out.ends_with(&format!("[truncated, {} total chars]", MAX_TOOL_RESULT_CHARS * 2)));
        assert_eq!(truncate_result("short".into()), "short");
    }
}
