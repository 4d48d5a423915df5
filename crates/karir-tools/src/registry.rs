//! Tool trait and the per-page registry the agent dispatches through

use karir_llm::LlmTool;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What a tool hands back to the model. Failures the user should hear about
/// (no vacancies, upstream down) are `Text`; `Error` is for calls the model
/// got wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolResult {
    Text(String),
    Error(String),
}

impl ToolResult {
    pub fn text(s: impl Into<String>) -> Self { Self::Text(s.into()) }
    pub fn error(s: impl Into<String>) -> Self { Self::Error(s.into()) }

    pub fn is_error(&self) -> bool { matches!(self, Self::Error(_)) }

    pub fn to_content_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Error(e) => format!("Error: {}", e),
        }
    }
}

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Function name the model calls, e.g. `search_job_vacancy`.
    fn name(&self) -> &str;

    /// Shown to the model; decides when the tool gets picked.
    fn description(&self) -> &str;

    /// Extra system prompt lines for pages carrying this tool.
    fn prompt(&self) -> &str { "" }

    fn input_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> ToolResult;
}

fn definition(tool: &dyn Tool) -> LlmTool {
    LlmTool {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        input_schema: tool.input_schema(),
    }
}

/// Tools keyed by name, iterated in name order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            warn!("Tool {} registered twice, keeping the last", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize { self.tools.len() }

    pub fn is_empty(&self) -> bool { self.tools.is_empty() }

    pub fn definitions(&self) -> Vec<LlmTool> {
        self.tools.values().map(|t| definition(t.as_ref())).collect()
    }

    /// Non-empty tool prompt fragments, one per line.
    pub fn prompt_fragments(&self) -> String {
        self.tools
            .values()
            .map(|t| t.prompt())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn execute(&self, name: &str, args: Value) -> ToolResult {
        self.execute_cancellable(name, args, CancellationToken::new()).await
    }

    /// Run a tool unless `cancel` fires first, in which case the model sees `[cancelled]`.
    pub async fn execute_cancellable(&self, name: &str, args: Value, cancel: CancellationToken) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            return ToolResult::error(format!("Tool not found: {}", name));
        };
        debug!("Running tool {} with {}", name, args);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => ToolResult::text("[cancelled]"),
            result = tool.execute(args) => result,
        }
    }
}
