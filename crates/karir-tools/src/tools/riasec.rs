//! RIASEC result tool

use crate::context::{CareerContext, NO_RESULT};
use crate::registry::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct RiasecResultTool {
    ctx: Arc<CareerContext>,
}

impl RiasecResultTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for RiasecResultTool {
    fn name(&self) -> &str { "get_riasec_result" }

    fn description(&self) -> &str {
        "Returns the user's top three RIASEC personality types with their scores, what each type means and \
         example careers. Use it to pick job keywords or to explain why a job fits."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> ToolResult {
        match self.ctx.top3() {
            Some(top3) => ToolResult::text(format!("RIASEC code {}\n{}", top3.code(), top3.describe())),
            None => ToolResult::text(NO_RESULT),
        }
    }
}
