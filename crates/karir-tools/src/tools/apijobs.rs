//! APIJobs tool - generic job search used when the alumni site has nothing

use crate::context::CareerContext;
use crate::registry::{Tool, ToolResult};
use crate::tools::str_arg;
use serde_json::{json, Value};
use std::sync::Arc;

const SHOW_HITS: &str = "\n\nShow this result to user DIRECTLY, with NO summarization. Make sure to ALWAYS SHOW the \
WEBSITE URL. If it returns nothing, say to user that NO JOBS are available for user query.";

pub struct SearchApiJobsTool {
    ctx: Arc<CareerContext>,
}

impl SearchApiJobsTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for SearchApiJobsTool {
    fn name(&self) -> &str { "search_apijobs" }

    fn description(&self) -> &str {
        "Searches the APIJobs database for a list of matching job vacancies. Use only when search_job_vacancy \
         returns no results. The keyword must be one relevant job name or position in ENGLISH."
    }

    fn prompt(&self) -> &str {
        "When results come from search_apijobs, tell the user nothing was found on the Petra alumni site and \
         that these vacancies come from APIJobs."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keyword": { "type": "string", "description": "Job name or position in English" }
            },
            "required": ["keyword"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let keyword = match str_arg(&args, "keyword") {
            Some(k) => k,
            None => return ToolResult::error("Missing required parameter: keyword"),
        };
        let text = self.ctx.apijobs.search_formatted(keyword).await;
        if text.starts_with("Error fetching job data") {
            return ToolResult::text(text);
        }
        ToolResult::text(format!("{}{}", text, SHOW_HITS))
    }
}
