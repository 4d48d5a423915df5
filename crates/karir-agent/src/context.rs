//! Chat memory budget with token estimation

use karir_llm::{ContentBlock, LlmContent, LlmMessage};

const CHARS_PER_TOKEN: f32 = 4.0;

pub struct ContextManager {
    max_tokens: usize,
    system_tokens: usize,
}

impl ContextManager {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens, system_tokens: 0 }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn estimate_tokens(text: &str) -> usize {
        (text.len() as f32 / CHARS_PER_TOKEN).ceil() as usize
    }

    pub fn message_tokens(message: &LlmMessage) -> usize {
        let content_tokens = match &message.content {
            LlmContent::Text(s) => Self::estimate_tokens(s),
            LlmContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { text } => Self::estimate_tokens(text),
                    ContentBlock::ToolUse { name, input, .. } => {
                        Self::estimate_tokens(name) + Self::estimate_tokens(&input.to_string())
                    }
                    ContentBlock::ToolResult { content, .. } => Self::estimate_tokens(content),
                })
                .sum(),
        };
        content_tokens + 10
    }

    pub fn set_system(&mut self, system: &str) {
        self.system_tokens = Self::estimate_tokens(system);
    }

    pub fn calculate_total(&self, messages: &[LlmMessage]) -> usize {
        let message_tokens: usize = messages.iter().map(Self::message_tokens).sum();
        self.system_tokens + message_tokens
    }

    /// Drop the oldest messages once over budget, down to 75% of it. The
    /// newest message always stays and history restarts at a plain user turn.
    pub fn compact(&self, messages: &mut Vec<LlmMessage>) -> usize {
        if messages.is_empty() || self.calculate_total(messages) <= self.max_tokens {
            return 0;
        }
        let target = (self.max_tokens as f32 * 0.75) as usize;
        let before = messages.len();
        while messages.len() > 1 && self.calculate_total(messages) > target {
            messages.remove(0);
        }
        while messages.len() > 1 && !starts_turn(&messages[0]) {
            messages.remove(0);
        }
        let dropped = before - messages.len();
        tracing::info!(
            "Compacted chat memory: dropped {}, {} messages, ~{} tokens",
            dropped,
            messages.len(),
            self.calculate_total(messages)
        );
        dropped
    }
}

fn starts_turn(message: &LlmMessage) -> bool {
    message.role == "user" && matches!(message.content, LlmContent::Text(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_estimation() {
        assert_eq!(ContextManager::estimate_tokens("hello"), 2);
        assert_eq!(ContextManager::estimate_tokens("hello world"), 3);
    }

    #[test]
    fn compaction_restarts_at_a_user_turn() {
        let cm = ContextManager::new(40);
        let mut messages = vec![
            LlmMessage::user("a".repeat(40)),
            LlmMessage {
                role: "user".into(),
                content: LlmContent::Blocks(vec![ContentBlock::ToolResult {
                    tool_use_id: "call_1".into(),
                    content: "r".repeat(8),
                    is_error: None,
                }]),
            },
            LlmMessage::assistant("d".repeat(8)),
            LlmMessage::user("e".repeat(8)),
        ];
        assert_eq!(cm.compact(&mut messages), 3);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}
