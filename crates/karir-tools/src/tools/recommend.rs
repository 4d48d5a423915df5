//! Recommendation tool - preference-aware vacancy matching against the RIASEC result

use crate::context::{CareerContext, NO_RESULT};
use crate::registry::{Tool, ToolResult};
use karir_jobs::{render_ranked_for_model, MatchOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

const SHOW_RANKED: &str = "\n\nShow it directly to user with location, type, system, educational level, salary \
range, application deadline, description, job requirements, link and the reason why that job matches the user's \
RIASEC result. DON'T call other tools again.";

const SHOW_FALLBACK: &str = "\n\nSay that nothing was found on the Petra alumni site and that these vacancies come \
from APIJobs. Always show the website URL. DON'T call other tools again.";

pub struct RecommendJobsTool {
    ctx: Arc<CareerContext>,
}

impl RecommendJobsTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for RecommendJobsTool {
    fn name(&self) -> &str { "recommend_jobs" }

    fn description(&self) -> &str {
        "Finds and ranks job vacancies that match the user's RIASEC result and recorded preferences. \
         Use it when the user asks for jobs that suit them."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> ToolResult {
        let Some(top3) = self.ctx.top3() else {
            return ToolResult::text(NO_RESULT);
        };
        let preferences = self.ctx.preferences.snapshot();
        info!("Recommending for {} with {} preference(s)", top3.code(), preferences.len());

        match self.ctx.matcher.run(&top3, &preferences).await {
            Ok(outcome @ MatchOutcome::Fallback { .. }) => {
                ToolResult::text(format!("{}{}", outcome.text(), SHOW_FALLBACK))
            }
            Ok(MatchOutcome::Ranked { keywords, jobs, text }) => {
                if jobs.is_empty() {
                    return ToolResult::text(text);
                }
                ToolResult::text(format!("{}{}", render_ranked_for_model(&jobs, &keywords), SHOW_RANKED))
            }
            Err(e) => ToolResult::text(format!("Error fetching jobs: {}", e)),
        }
    }
}
