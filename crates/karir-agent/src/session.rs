//! In-memory chat sessions with a bounded memory

use crate::context::ContextManager;
use dashmap::DashMap;
use karir_llm::{ContentBlock, LlmContent, LlmMessage};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use karir_core::SessionKey;

pub struct SessionRegistry {
    sessions: DashMap<SessionKey, Arc<Session>>,
}

impl Default for SessionRegistry {
    fn default() -> Self { Self::new() }
}

impl SessionRegistry {
    pub fn new() -> Self { Self { sessions: DashMap::new() } }

    pub fn get_or_create(&self, key: &SessionKey, system_prompt: Option<&str>, memory_tokens: usize) -> Arc<Session> {
        self.sessions
            .entry(key.clone())
            .or_insert_with(|| {
                info!("Session {} created (memory {} tokens)", key, memory_tokens);
                Arc::new(Session::new(key.clone(), system_prompt, memory_tokens))
            })
            .clone()
    }

    pub fn get(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.get(key).map(|s| s.clone())
    }

    pub fn list(&self) -> Vec<SessionKey> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn remove(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.remove(key).map(|(_, s)| s)
    }
}

/// History and its token budget, locked together so compaction sees what it trims.
struct Memory {
    messages: Vec<LlmMessage>,
    budget: ContextManager,
}

impl Memory {
    fn push(&mut self, message: LlmMessage) {
        self.messages.push(message);
    }
}

/// One conversation on one page. The system prompt is fixed at creation.
pub struct Session {
    pub key: SessionKey,
    system_prompt: Option<String>,
    memory: RwLock<Memory>,
}

impl Session {
    pub fn new(key: SessionKey, system_prompt: Option<&str>, memory_tokens: usize) -> Self {
        let mut budget = ContextManager::new(memory_tokens);
        if let Some(sys) = system_prompt {
            budget.set_system(sys);
        }
        Self {
            key,
            system_prompt: system_prompt.map(String::from),
            memory: RwLock::new(Memory { messages: Vec::new(), budget }),
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Append a user message, forgetting the oldest turns once over budget.
    pub async fn add_user_message(&self, content: &str) {
        let mut memory = self.memory.write().await;
        memory.push(LlmMessage::user(content));
        let Memory { messages, budget } = &mut *memory;
        let dropped = budget.compact(messages);
        if dropped > 0 {
            debug!("Session {} forgot {} messages", self.key, dropped);
        }
    }

    pub async fn add_assistant_text(&self, content: &str) {
        self.memory.write().await.push(LlmMessage::assistant(content));
    }

    pub async fn add_assistant_with_tools(&self, text: Option<&str>, tool_calls: Vec<ContentBlock>) {
        let blocks: Vec<ContentBlock> = text
            .filter(|t| !t.is_empty())
            .map(|t| ContentBlock::Text { text: t.to_string() })
            .into_iter()
            .chain(tool_calls)
            .collect();
        self.memory
            .write()
            .await
            .push(LlmMessage { role: "assistant".to_string(), content: LlmContent::Blocks(blocks) });
    }

    /// Results of one tool round share a single user message.
    pub async fn add_tool_result(&self, tool_use_id: &str, content: &str, is_error: bool) {
        let block = ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: content.to_string(),
            is_error: is_error.then_some(true),
        };

        let mut memory = self.memory.write().await;
        if let Some(results) = memory.messages.last_mut().and_then(open_results) {
            results.push(block);
        } else {
            memory.push(LlmMessage { role: "user".to_string(), content: LlmContent::Blocks(vec![block]) });
        }
    }

    pub async fn get_messages(&self) -> Vec<LlmMessage> {
        self.memory.read().await.messages.clone()
    }

    pub async fn message_count(&self) -> usize {
        self.memory.read().await.messages.len()
    }

    /// Estimated tokens of system prompt plus history.
    pub async fn token_count(&self) -> usize {
        let memory = self.memory.read().await;
        memory.budget.calculate_total(&memory.messages)
    }
}

fn open_results(message: &mut LlmMessage) -> Option<&mut Vec<ContentBlock>> {
    match &mut message.content {
        LlmContent::Blocks(blocks)
            if message.role == "user" && blocks.iter().any(|b| matches!(b, ContentBlock::ToolResult { .. })) =>
        {
            Some(blocks)
        }
        _ => None,
    }
}
