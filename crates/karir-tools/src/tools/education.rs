//! Educational content tools - topic generation and web search

use crate::context::{CareerContext, NO_RESULT};
use crate::registry::{Tool, ToolResult};
use crate::tools::str_arg;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct EducationalTopicTool {
    ctx: Arc<CareerContext>,
}

impl EducationalTopicTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for EducationalTopicTool {
    fn name(&self) -> &str { "provide_educational_topic" }

    fn description(&self) -> &str {
        "Provides one topic for educational content that suits the user's RIASEC result. \
         Pass the topic to search_educational_content."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> ToolResult {
        let Some(top3) = self.ctx.top3() else {
            return ToolResult::text(NO_RESULT);
        };
        match self.ctx.education.topic(&top3).await {
            Ok(topic) => ToolResult::text(topic),
            Err(e) => ToolResult::error(format!("Topic generation failed: {}", e)),
        }
    }
}

pub struct SearchEducationalContentTool {
    ctx: Arc<CareerContext>,
}

impl SearchEducationalContentTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for SearchEducationalContentTool {
    fn name(&self) -> &str { "search_educational_content" }

    fn description(&self) -> &str {
        "Searches the web for educational content on a topic. Use the topic from provide_educational_topic."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string", "description": "Topic to find courses and articles for" }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let topic = match str_arg(&args, "topic") {
            Some(t) => t,
            None => return ToolResult::error("Missing required parameter: topic"),
        };
        let labels = self.ctx.top3().map(|t| t.labels()).unwrap_or_else(|| topic.to_string());

        match self.ctx.education.find_content(topic, self.ctx.search_results).await {
            Ok(content) if content.starts_with("No educational content found") => ToolResult::text(content),
            Ok(content) => ToolResult::text(format!(
                "{}\n\nShow to user the summary and reason why the content matches the user's RIASEC result \
                 ({}). ALWAYS show user the URL. DON'T call other tools again.",
                content, labels
            )),
            Err(e) => ToolResult::text(format!("Error fetching educational content. {}", e)),
        }
    }
}
